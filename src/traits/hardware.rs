//! Hardware capability traits for the controller peripherals.
//!
//! Each controller drives exactly one peripheral and, optionally, samples one
//! physical input. The traits below are the whole surface the core needs
//! from the hardware; everything behind them (PWM timers, GPIO drivers, ADC
//! channels, LED strip timing, one-wire sensor protocol) is a platform shim.
//!
//! | Trait | Used by | Purpose |
//! |-------|---------|---------|
//! | [`PwmOutput`] | blinds | Servo duty cycle |
//! | [`DigitalOutput`] | fan, light | On/off output pin |
//! | [`LedStrip`] | RGB matrix | Fill, brightness, latch |
//! | [`ClimateSensor`] | climate sensor | Blocking temperature/humidity read |
//! | [`DigitalInput`] | poller | Push button level |
//! | [`AnalogInput`] | poller | Potentiometer level |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::traits::{DigitalOutput, PwmOutput};
//! use rs_homenode::hal::{MockServo, MockSwitch};
//!
//! let mut servo = MockServo::new();
//! servo.set_duty_u16(1400).unwrap();
//! assert_eq!(servo.duty, 1400);
//!
//! let mut fan = MockSwitch::new();
//! fan.set_level(true).unwrap();
//! assert!(fan.level);
//! ```

use core::fmt::Debug;

/// An 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb {
    /// All channels off.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Build a colour from its channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// True when every channel is zero.
    pub const fn is_black(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }
}

/// PWM output with a 16-bit duty cycle.
///
/// Blinds drive a hobby servo with this; the servo frequency is set up by the
/// implementation, the core only moves the duty.
pub trait PwmOutput {
    /// Error type for PWM operations.
    type Error: Debug;

    /// Set the duty cycle, where `u16::MAX` is 100 %.
    fn set_duty_u16(&mut self, duty: u16) -> Result<(), Self::Error>;
}

/// A digital output pin.
pub trait DigitalOutput {
    /// Error type for pin operations.
    type Error: Debug;

    /// Drive the pin high (`true`) or low (`false`).
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// A digital input pin, sampled by the input poller.
///
/// Implementations return the logical level: `true` means "pressed"
/// regardless of the electrical polarity of the button.
pub trait DigitalInput {
    /// Sample the current level.
    fn is_high(&mut self) -> bool;
}

/// A 16-bit analog input, e.g. a potentiometer on an ADC channel.
pub trait AnalogInput {
    /// Error type for conversions.
    type Error: Debug;

    /// Read the level scaled to the full `u16` range.
    fn read_u16(&mut self) -> Result<u16, Self::Error>;
}

/// An addressable RGB LED strip or matrix.
///
/// Changes are staged by [`fill`](Self::fill) and
/// [`set_brightness`](Self::set_brightness) and only become visible after
/// [`show`](Self::show).
pub trait LedStrip {
    /// Error type for strip operations.
    type Error: Debug;

    /// Stage the same colour on every LED.
    fn fill(&mut self, color: Rgb);

    /// Stage the global brightness (0-255).
    fn set_brightness(&mut self, brightness: u8);

    /// Latch the staged frame onto the LEDs.
    fn show(&mut self) -> Result<(), Self::Error>;

    /// Staged colour of one LED, if the index exists.
    fn pixel(&self, index: usize) -> Option<Rgb>;
}

/// One temperature/humidity measurement.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

/// A blocking temperature/humidity sensor (DHT11-class, one-wire).
pub trait ClimateSensor {
    /// Error type for failed acquisitions (timeouts, checksum mismatch).
    type Error: Debug;

    /// Perform one acquisition. Blocks for the duration of the transfer.
    fn read(&mut self) -> Result<Measurement, Self::Error>;
}
