//! ESP32-C3 SuperMini hardware abstraction layer for the home controllers.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Blinds**: hobby servo on a LEDC channel, potentiometer on ADC1
//! - **Fan / Light**: relay or MOSFET on a digital output
//! - **Matrix**: 8x8 WS2812 on an RMT channel
//! - **Sensor**: DHT11 on an open-drain GPIO
//! - **Input**: one push button per controller (none on the sensor)
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments matching the SuperMini layout.

mod button;
mod dht11;
mod matrix;
mod output;
mod potentiometer;
mod servo;

pub use button::Esp32Button;
pub use dht11::Esp32Dht11;
pub use matrix::Esp32Matrix;
pub use output::Esp32Output;
pub use potentiometer::Esp32Potentiometer;
pub use servo::Esp32Servo;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

/// Pin assignments for SuperMini ESP32-C3.
pub mod pins {
    // =========================================================================
    // Blinds
    // =========================================================================

    /// Servo signal (LEDC channel 0, 50 Hz)
    pub const SERVO: i32 = 2;

    /// Potentiometer wiper (ADC1 channel 4)
    pub const POTENTIOMETER: i32 = 4;

    // =========================================================================
    // Fan / Light
    // =========================================================================

    /// Relay or MOSFET gate
    pub const SWITCH_OUTPUT: i32 = 3;

    // =========================================================================
    // Matrix / Sensor
    // =========================================================================

    /// WS2812 data in (RMT channel 0)
    pub const MATRIX_DATA: i32 = 5;

    /// DHT11 data line (open drain, pull-up)
    pub const DHT11_DATA: i32 = 6;

    // =========================================================================
    // Shared
    // =========================================================================

    /// Push button (active high, internal pull-down)
    pub const BUTTON: i32 = 10;
}
