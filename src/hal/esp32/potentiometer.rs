//! Potentiometer on an ESP32 ADC1 channel.
//!
//! The ADC delivers 12-bit raw counts; they are stretched onto the full
//! `u16` range so the core can compute `raw / 65535` independently of the
//! chip's ADC width.
//!
//! # Wiring
//!
//! - Wiper → ADC1 pin (GPIO4 on the SuperMini)
//! - Ends → 3.3 V and GND
//!
//! Note: ADC2 is shared with the WiFi radio and unusable while connected,
//! so only ADC1 pins are accepted.

use crate::traits::AnalogInput;
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::ADCPin;
use esp_idf_hal::peripheral::Peripheral;

/// Potentiometer via ADC oneshot mode.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Potentiometer;
/// use rs_homenode::traits::AnalogInput;
///
/// let peripherals = Peripherals::take()?;
/// let adc = AdcDriver::new(peripherals.adc1)?;
/// let mut pot = Esp32Potentiometer::new(&adc, peripherals.pins.gpio4)?;
///
/// let level = pot.read_u16()?; // 0..=65535
/// ```
pub struct Esp32Potentiometer<'d, P>
where
    P: ADCPin<Adc = ADC1>,
{
    channel: AdcChannelDriver<'d, P, &'d AdcDriver<'d, ADC1>>,
}

impl<'d, P> Esp32Potentiometer<'d, P>
where
    P: ADCPin<Adc = ADC1>,
{
    /// Full-scale raw count of the 12-bit ADC.
    const RAW_MAX: u32 = 4095;

    /// Creates a potentiometer input with 11 dB attenuation (0-3.1 V).
    ///
    /// # Arguments
    ///
    /// * `adc` - Reference to ADC1 driver (must outlive this struct)
    /// * `pin` - ADC1-capable GPIO
    ///
    /// # Errors
    ///
    /// Returns an error if ADC channel initialization fails.
    pub fn new(
        adc: &'d AdcDriver<'d, ADC1>,
        pin: impl Peripheral<P = P> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(adc, pin, &config)?;
        Ok(Self { channel })
    }

    /// Stretch a 12-bit count onto `u16`.
    fn stretch(raw: u16) -> u16 {
        let clamped = u32::from(raw).min(Self::RAW_MAX);
        (clamped * u32::from(u16::MAX) / Self::RAW_MAX) as u16
    }
}

impl<P> AnalogInput for Esp32Potentiometer<'_, P>
where
    P: ADCPin<Adc = ADC1>,
{
    type Error = esp_idf_hal::sys::EspError;

    fn read_u16(&mut self) -> Result<u16, Self::Error> {
        let raw = self.channel.read_raw()?;
        Ok(Self::stretch(raw))
    }
}
