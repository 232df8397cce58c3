//! Exclusive-access seam over a device's state.
//!
//! Both the request server and the input poller mutate the same device. All
//! of their reads and writes go through [`StateGuard::with_state`], which runs
//! a closure with exclusive access. The closure returns before the next
//! holder gets in, so every read-modify-write is atomic with respect to the
//! other context.

use alloc::sync::Arc;

use crate::device::Device;

/// Exclusive access to one device.
pub trait StateGuard {
    /// The device behind the guard.
    type Device: Device;

    /// Run `f` with exclusive access to the device.
    ///
    /// Keep the closure short: it blocks every other holder. Never call back
    /// into the same guard from inside `f`.
    fn with_state<R>(&self, f: impl FnOnce(&mut Self::Device) -> R) -> R;
}

impl<G: StateGuard + ?Sized> StateGuard for Arc<G> {
    type Device = G::Device;

    fn with_state<R>(&self, f: impl FnOnce(&mut Self::Device) -> R) -> R {
        (**self).with_state(f)
    }
}

impl<G: StateGuard + ?Sized> StateGuard for &G {
    type Device = G::Device;

    fn with_state<R>(&self, f: impl FnOnce(&mut Self::Device) -> R) -> R {
        (**self).with_state(f)
    }
}
