//! Hobby servo driven by the ESP32 LEDC PWM peripheral.
//!
//! The core speaks 16-bit duty (`u16::MAX` = 100 %), the same scale the stock
//! blinds firmware used, so the duty range 1400-7700 maps to pulses of
//! roughly 0.4-2.4 ms at 50 Hz. The LEDC channel runs at 14-bit resolution
//! and the duty is rescaled on every write.

use crate::traits::PwmOutput;
use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;

/// Servo PWM output for ESP32.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Servo;
/// use rs_homenode::traits::PwmOutput;
///
/// let peripherals = Peripherals::take()?;
/// let mut servo = Esp32Servo::new(
///     peripherals.pins.gpio2,
///     peripherals.ledc.timer0,
///     peripherals.ledc.channel0,
///     50,
/// )?;
///
/// servo.set_duty_u16(7700)?; // fully open
/// ```
pub struct Esp32Servo<'d> {
    channel: LedcDriver<'d>,
    max_duty: u32,
}

impl<'d> Esp32Servo<'d> {
    /// PWM resolution (14-bit is the finest LEDC supports at 50 Hz on all chips)
    const PWM_RESOLUTION: Resolution = Resolution::Bits14;

    /// Creates a servo output. The pin is left at duty 0 (no pulses).
    ///
    /// # Errors
    ///
    /// Returns an error if PWM initialization fails.
    pub fn new<T, TI, C, CI, P, PI>(
        pin: P,
        timer: T,
        channel: C,
        frequency_hz: u32,
    ) -> Result<Self, esp_idf_hal::sys::EspError>
    where
        TI: esp_idf_hal::ledc::LedcTimer + 'd,
        T: Peripheral<P = TI> + 'd,
        CI: esp_idf_hal::ledc::LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        C: Peripheral<P = CI> + 'd,
        PI: esp_idf_hal::gpio::OutputPin + 'd,
        P: Peripheral<P = PI> + 'd,
    {
        let timer_config = TimerConfig::default()
            .frequency(frequency_hz.Hz())
            .resolution(Self::PWM_RESOLUTION);
        let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;

        let mut channel = LedcDriver::new(channel, timer_driver, pin)?;
        channel.set_duty(0)?;
        let max_duty = channel.get_max_duty();

        Ok(Self { channel, max_duty })
    }

    /// Rescale a 16-bit duty onto the channel's resolution.
    fn scale(&self, duty: u16) -> u32 {
        (u64::from(duty) * u64::from(self.max_duty) / u64::from(u16::MAX)) as u32
    }
}

impl PwmOutput for Esp32Servo<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_duty_u16(&mut self, duty: u16) -> Result<(), Self::Error> {
        let scaled = self.scale(duty);
        self.channel.set_duty(scaled)
    }
}
