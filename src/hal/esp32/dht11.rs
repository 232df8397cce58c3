//! DHT11 temperature/humidity sensor on one open-drain GPIO.
//!
//! The host pulls the line low for 18 ms, releases it, and the sensor
//! answers with an 80 µs low/high handshake followed by 40 bits. Every bit
//! starts with a ~50 µs low; a high phase still present 35 µs later is a 1.

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{InputOutput, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::hal::dht11::{decode_frame, Dht11Error, FRAME_LEN};
use crate::traits::{ClimateSensor, Measurement};

const START_LOW_MS: u32 = 18;
const START_RELEASE_US: u32 = 30;
const BIT_SAMPLE_US: u32 = 35;
const MAX_WAIT_US: u32 = 100;

/// DHT11 sensor for ESP32.
///
/// Reads block for about 25 ms. The DHT11 needs about a second between
/// acquisitions; reading faster yields timeouts.
///
/// # Example
///
/// ```ignore
/// use rs_homenode::hal::esp32::Esp32Dht11;
/// use rs_homenode::traits::ClimateSensor;
///
/// let peripherals = Peripherals::take()?;
/// let mut dht = Esp32Dht11::new(peripherals.pins.gpio6)?;
/// let m = dht.read()?;
/// println!("{} C, {} %", m.temperature, m.humidity);
/// ```
pub struct Esp32Dht11<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, InputOutput>,
}

impl<'d, P> Esp32Dht11<'d, P>
where
    P: InputPin + OutputPin,
{
    /// Configure `pin` as open drain with the pull-up on, line released.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self { pin })
    }

    fn wait_for(&self, high: bool) -> Result<(), Dht11Error<EspError>> {
        for _ in 0..MAX_WAIT_US {
            if self.pin.is_high() == high {
                return Ok(());
            }
            Ets::delay_us(1);
        }
        Err(Dht11Error::Timeout)
    }

    fn start(&mut self) -> Result<(), Dht11Error<EspError>> {
        self.pin.set_low().map_err(Dht11Error::Pin)?;
        FreeRtos::delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(Dht11Error::Pin)?;
        Ets::delay_us(START_RELEASE_US);

        self.wait_for(false)?;
        self.wait_for(true)
    }

    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], Dht11Error<EspError>> {
        let mut frame = [0u8; FRAME_LEN];
        for byte in frame.iter_mut() {
            for bit in (0..8).rev() {
                self.wait_for(false)?;
                self.wait_for(true)?;
                Ets::delay_us(BIT_SAMPLE_US);
                if self.pin.is_high() {
                    *byte |= 1 << bit;
                }
            }
        }
        Ok(frame)
    }
}

impl<P> ClimateSensor for Esp32Dht11<'_, P>
where
    P: InputPin + OutputPin,
{
    type Error = Dht11Error<EspError>;

    fn read(&mut self) -> Result<Measurement, Self::Error> {
        self.start()?;
        let frame = self.read_frame();
        // Release the line whatever happened
        let _ = self.pin.set_high();
        decode_frame(frame?)
    }
}
