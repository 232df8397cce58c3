//! Long-running services of a controller.
//!
//! Every controller runs up to two contexts over one shared device:
//! - the connection server, answering one request at a time
//! - the input poller, applying button presses (not on the sensor)
//!
//! Both go through `SharedDevice<D>`, wrapped in `Arc`, and never touch the
//! device any other way.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_homenode::services::{ConnectionServer, InputPoller, SharedDevice, ToggleAction};
//!
//! let fan = Arc::new(SharedDevice::new(fan));
//! InputPoller::new(Arc::clone(&fan), button, ToggleAction).spawn()?;
//! ConnectionServer::new(listener, fan).run();
//! ```

pub mod poller;
pub mod server;
pub mod shared;

// Async server (tokio)
#[cfg(feature = "tokio")]
pub mod server_async;

// Re-exports
pub use poller::*;
pub use server::*;
pub use shared::*;

#[cfg(feature = "tokio")]
pub use server_async::*;
