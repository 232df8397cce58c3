//! Shared device state for the request server and the input poller.
//!
//! `SharedDevice` wraps one device in a mutex and is the only way either
//! context touches it. Wrap it in an `Arc` and hand a clone to each side.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_homenode::device::{Device, Fan};
//! use rs_homenode::hal::MockSwitch;
//! use rs_homenode::services::SharedDevice;
//!
//! let fan = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
//!
//! // Poller side: physical toggle
//! let poller_side = Arc::clone(&fan);
//! poller_side.with_state(|f| f.toggle()).unwrap();
//!
//! // Server side: read
//! let body = fan.snapshot().unwrap().to_body();
//! assert_eq!(body, "1");
//! ```

use std::sync::{Mutex, PoisonError};

use crate::device::{Device, DeviceState};
use crate::error::Result;
use crate::traits::StateGuard;

/// A device behind a mutex.
///
/// # Thread Safety
///
/// - Uses `Mutex` rather than `RwLock`: even reads may need `&mut` (the
///   sensor acquires on every read) and both contexts mostly write.
/// - A panic inside a closure poisons the mutex; later holders recover the
///   inner value rather than propagating the panic, since every mutation
///   commits state only after its hardware write succeeded.
#[derive(Debug)]
pub struct SharedDevice<D: Device> {
    device: Mutex<D>,
}

impl<D: Device> SharedDevice<D> {
    /// Take ownership of a device.
    pub fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }

    /// Run `f` with exclusive access to the device.
    ///
    /// The closure pattern prevents accidentally holding the lock across a
    /// blocking socket call.
    pub fn with_state<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut D) -> R,
    {
        let mut guard = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Read the current state under the lock.
    ///
    /// # Errors
    ///
    /// Whatever [`Device::state`] reports, e.g. a failed sensor acquisition.
    pub fn snapshot(&self) -> Result<DeviceState> {
        self.with_state(|device| device.state())
    }

    /// Recover the device, e.g. after the server has stopped.
    pub fn into_inner(self) -> D {
        self.device
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Device> StateGuard for SharedDevice<D> {
    type Device = D;

    fn with_state<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        SharedDevice::with_state(self, f)
    }
}
