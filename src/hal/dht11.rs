//! DHT11 single-wire frame decoding.
//!
//! A DHT11 answers the start signal with 40 bits, MSB first:
//!
//! ```text
//! [humidity int][humidity dec][temp int][temp dec][checksum]
//! ```
//!
//! The checksum is the low byte of the sum of the first four. Bit 7 of the
//! temperature decimal byte marks a negative temperature.
//!
//! Only the frame arithmetic lives here; the pin timing is in the ESP32
//! driver.

use core::fmt::Debug;

use thiserror::Error;

use crate::traits::Measurement;

/// Bytes in one DHT11 frame, checksum included.
pub const FRAME_LEN: usize = 5;

/// Failures of one DHT11 acquisition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Dht11Error<E: Debug> {
    /// The sensor did not drive the expected level in time.
    #[error("sensor did not respond in time")]
    Timeout,

    /// The transmitted checksum does not match the data bytes.
    #[error("checksum mismatch: frame says {received:#04x}, data sums to {computed:#04x}")]
    Checksum {
        /// Checksum byte as received.
        received: u8,
        /// Checksum of the four data bytes.
        computed: u8,
    },

    /// The GPIO driver failed.
    #[error("pin error: {0:?}")]
    Pin(E),
}

/// Turn a received frame into a measurement.
///
/// # Errors
///
/// [`Dht11Error::Checksum`] if the frame is corrupt.
pub fn decode_frame<E: Debug>(frame: [u8; FRAME_LEN]) -> Result<Measurement, Dht11Error<E>> {
    let [h_int, h_dec, t_int, t_dec, received] = frame;
    let computed = h_int
        .wrapping_add(h_dec)
        .wrapping_add(t_int)
        .wrapping_add(t_dec);
    if computed != received {
        return Err(Dht11Error::Checksum { received, computed });
    }

    let humidity = f32::from(h_int) + f32::from(h_dec) / 10.0;
    let magnitude = f32::from(t_int) + f32::from(t_dec & 0x7F) / 10.0;
    let temperature = if t_dec & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Measurement {
        temperature,
        humidity,
    })
}
