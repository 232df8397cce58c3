//! WS2812 LED matrix on the RMT peripheral.
//!
//! Each bit is one high/low pulse pair; the pair's split encodes 0 or 1.
//! Colour and brightness are staged in RAM and only sent on `show`.

use core::time::Duration;

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::{PinState, Pulse, RmtChannel, TxRmtDriver, VariableLengthSignal};
use esp_idf_hal::sys::EspError;

use crate::hal::ws2812::{pixel_bits, BITS_PER_PIXEL};
use crate::traits::{LedStrip, Rgb};

/// WS2812 strip or matrix for ESP32.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Matrix;
/// use rs_homenode::traits::{LedStrip, Rgb};
///
/// let peripherals = Peripherals::take()?;
/// let mut strip = Esp32Matrix::new(peripherals.rmt.channel0, peripherals.pins.gpio5, 64)?;
/// strip.fill(Rgb::new(255, 0, 0));
/// strip.set_brightness(10);
/// strip.show()?;
/// ```
pub struct Esp32Matrix<'d> {
    tx: TxRmtDriver<'d>,
    zero: [Pulse; 2],
    one: [Pulse; 2],
    pixels: Vec<Rgb>,
    brightness: u8,
}

impl<'d> Esp32Matrix<'d> {
    /// WS2812 high/low times in nanoseconds for a 0 bit.
    const T0: (u64, u64) = (350, 800);
    /// WS2812 high/low times in nanoseconds for a 1 bit.
    const T1: (u64, u64) = (700, 600);

    /// Drive `len` LEDs from `pin`. Nothing is sent until the first `show`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RMT channel cannot be configured.
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'd,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
        len: usize,
    ) -> Result<Self, EspError> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)?;

        let ticks_hz = tx.counter_clock()?;
        let pulse = |state, nanos| {
            Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(nanos))
        };
        let zero = [pulse(PinState::High, Self::T0.0)?, pulse(PinState::Low, Self::T0.1)?];
        let one = [pulse(PinState::High, Self::T1.0)?, pulse(PinState::Low, Self::T1.1)?];

        Ok(Self {
            tx,
            zero,
            one,
            pixels: vec![Rgb::BLACK; len],
            brightness: u8::MAX,
        })
    }
}

impl LedStrip for Esp32Matrix<'_> {
    type Error = EspError;

    fn fill(&mut self, color: Rgb) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn show(&mut self) -> Result<(), EspError> {
        let mut signal =
            VariableLengthSignal::with_capacity(self.pixels.len() * BITS_PER_PIXEL as usize * 2);
        for &pixel in &self.pixels {
            for bit in pixel_bits(pixel, self.brightness) {
                let pair = if bit { &self.one } else { &self.zero };
                signal.push(pair.iter())?;
            }
        }
        self.tx.start_blocking(&signal)
    }

    fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }
}
