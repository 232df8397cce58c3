//! # rs-homenode
//!
//! Firmware core for single-board home controllers: servo-driven blinds, a
//! fan, a light, an RGB LED matrix and a temperature/humidity sensor.
//!
//! ## Features
//!
//! - **Tiny wire protocol**: one request line per connection, parameters in
//!   the query string, a fixed header block back
//! - **Typed commands**: parameters are validated before any state is touched
//! - **Physical input**: a button (and, for blinds, a potentiometer) mutates
//!   the same state as the network, concurrently and race-free
//! - **Hardware abstraction**: small capability traits, mocks for desktop
//!   and tests, ESP32 drivers behind the `esp32` feature
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware, guard and transport abstractions
//! - `wire` / `response` - Request decoder and response encoder
//! - `device` - Per-controller state, routes and commands
//! - `router` - Request → device operation → outcome
//! - `services` - Shared device guard, connection server, input poller
//! - `controller` - Assembles the above from a `Config`
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_homenode::{
//!     device::Blinds,
//!     hal::{MockAcceptor, MockButton, MockPotentiometer, MockServo},
//!     services::{ConnectionServer, InputPoller, PotentiometerAction, SharedDevice},
//! };
//!
//! let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
//!
//! // Network side
//! let mut acceptor = MockAcceptor::new();
//! let response = acceptor.push_request("POST /position?percentage=55 HTTP/1.1\r\n\r\n");
//! let mut server = ConnectionServer::new(acceptor, Arc::clone(&blinds));
//! server.serve_one().unwrap();
//! assert!(response.text().starts_with("HTTP/1.0 200 OK"));
//!
//! // Physical side
//! let button = MockButton::new();
//! let pot = MockPotentiometer::new();
//! let mut poller = InputPoller::new(
//!     Arc::clone(&blinds),
//!     button.clone(),
//!     PotentiometerAction::new(pot.clone()),
//! );
//! pot.set_raw(0);
//! button.press();
//! poller.poll();
//!
//! assert_eq!(blinds.snapshot().unwrap().to_body(), "0");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Devices: state, routes and validated commands.
pub mod device;
/// Error taxonomy and status mapping.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Outcomes and the response encoder.
pub mod response;
/// Request router.
pub mod router;
/// Core traits for hardware, state and transport abstraction.
pub mod traits;
/// Request-line decoder.
pub mod wire;

/// Controller assembly (requires `std`).
#[cfg(feature = "std")]
pub mod controller;

/// Shared device guard, connection server and input poller (requires `std`).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use device::{
    Blinds, ColorSetting, Device, DeviceKind, DeviceState, Fan, Light, Matrix, Sensor, Switch,
};
pub use error::{Error, InvalidParameter, MalformedRequest, Result};
pub use response::{encode, Outcome, Status};
pub use router::{dispatch, handle};
pub use traits::{
    // Hardware
    AnalogInput,
    ClimateSensor,
    DigitalInput,
    DigitalOutput,
    LedStrip,
    Measurement,
    PwmOutput,
    Rgb,
    // State
    StateGuard,
};
pub use wire::{decode, Request, Verb};

// Config re-exports
pub use config::{
    Config, DeviceConfig, InputConfig, MatrixConfig, NetworkConfig, ServerConfig, ServoConfig,
    WifiConfig,
};

#[cfg(feature = "std")]
pub use controller::Controller;

#[cfg(feature = "std")]
pub use services::{ConnectionServer, InputPoller, SharedDevice};

#[cfg(feature = "std")]
pub use traits::Acceptor;
