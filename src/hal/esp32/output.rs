//! Digital output pin for the fan and light relays.

use crate::traits::DigitalOutput;
use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;

/// Push-pull output for ESP32. Starts low.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Output;
/// use rs_homenode::traits::DigitalOutput;
///
/// let peripherals = Peripherals::take()?;
/// let mut fan = Esp32Output::new(peripherals.pins.gpio3)?;
/// fan.set_level(true)?;
/// ```
pub struct Esp32Output<'d, P: OutputPin> {
    pin: PinDriver<'d, P, Output>,
}

impl<'d, P: OutputPin> Esp32Output<'d, P> {
    /// Configure `pin` as an output, driven low.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }
}

impl<P: OutputPin> DigitalOutput for Esp32Output<'_, P> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
