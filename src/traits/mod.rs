//! Trait definitions for hardware, state and transport abstraction.
//!
//! This module defines the seams that allow rs-homenode to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Share one device between the request server and the input poller
//! - Serve requests over a real TCP listener or in-memory streams
//!
//! # Submodules
//!
//! - `hardware`: PWM, digital I/O, analog input, LED strip, climate sensor
//! - `guard`: exclusive access to a device's state
//! - `network`: connection acceptor (requires `std`)

pub mod guard;
pub mod hardware;

#[cfg(feature = "std")]
pub mod network;

pub use guard::*;
pub use hardware::*;

#[cfg(feature = "std")]
pub use network::*;
