//! WS2812 pixel encoding.
//!
//! The LEDs take 24 bits per pixel in green-red-blue order, MSB first. There
//! is no brightness register on the chip, so the global brightness is
//! applied to every channel before encoding.

use crate::traits::Rgb;

/// Bits sent per pixel.
pub const BITS_PER_PIXEL: u32 = 24;

/// Scale one channel by a 0-255 brightness.
#[inline]
pub fn dim(channel: u8, brightness: u8) -> u8 {
    ((u16::from(channel) * u16::from(brightness)) / 255) as u8
}

/// The 24-bit GRB word for one pixel at a brightness.
pub fn grb_word(color: Rgb, brightness: u8) -> u32 {
    let g = u32::from(dim(color.green, brightness));
    let r = u32::from(dim(color.red, brightness));
    let b = u32::from(dim(color.blue, brightness));
    (g << 16) | (r << 8) | b
}

/// Bits of one pixel in wire order.
pub fn pixel_bits(color: Rgb, brightness: u8) -> impl Iterator<Item = bool> {
    let word = grb_word(color, brightness);
    (0..BITS_PER_PIXEL).rev().map(move |i| (word >> i) & 1 == 1)
}
