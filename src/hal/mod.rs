//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `esp32`: ESP32 servo, output, button, potentiometer, LED matrix and
//!   DHT11 drivers (requires `esp32` feature)
//!
//! `dht11` and `ws2812` hold the wire arithmetic of the sensor and LED
//! drivers, independent of any chip.

pub mod dht11;
pub mod mock;
pub mod ws2812;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
