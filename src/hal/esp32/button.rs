//! Push button input for ESP32.
//!
//! The stock controllers wire the button between 3.3 V and the GPIO, so a
//! press reads high. Buttons wired to ground can be used with
//! [`Esp32Button::active_low`], which enables the pull-up and inverts the
//! level.
//!
//! # Wiring
//!
//! - Active high: button → 3.3 V, internal pull-down
//! - Active low: button → GND, internal pull-up

use crate::traits::DigitalInput;
use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

/// Push button for ESP32.
///
/// Edge detection is done by the input poller; this only samples the level.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Button;
/// use rs_homenode::traits::DigitalInput;
///
/// let peripherals = Peripherals::take()?;
/// let mut button = Esp32Button::active_high(peripherals.pins.gpio10)?;
/// if button.is_high() {
///     println!("pressed");
/// }
/// ```
pub struct Esp32Button<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, Input>,
    active_low: bool,
}

impl<'d, P> Esp32Button<'d, P>
where
    P: InputPin + OutputPin,
{
    /// A button that reads high when pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn active_high(
        pin: impl Peripheral<P = P> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        Self::new(pin, false)
    }

    /// A button that pulls the pin to ground when pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn active_low(
        pin: impl Peripheral<P = P> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        Self::new(pin, true)
    }

    fn new(
        pin: impl Peripheral<P = P> + 'd,
        active_low: bool,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(if active_low { Pull::Up } else { Pull::Down })?;
        Ok(Self { pin, active_low })
    }
}

impl<P> DigitalInput for Esp32Button<'_, P>
where
    P: InputPin + OutputPin,
{
    fn is_high(&mut self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
