//! RGB LED matrix.
//!
//! The whole matrix shows one colour at one brightness. Besides the current
//! setting the device remembers the last non-zero setting, so that the
//! physical button can turn the matrix off and back on to the same colour.
//!
//! # Off/on cycle
//!
//! ```text
//! (10,20,30,5) ──set black──► (0,0,0,5)   last_active = (10,20,30,5)
//! (0,0,0,5)    ──button────► (10,20,30,5)
//! ```
//!
//! Turning off an already-black matrix keeps `last_active` as it was, so a
//! repeated "off" never loses the colour to restore.

use crate::error::{Error, Result};
use crate::traits::{LedStrip, Rgb};
use crate::wire::Params;

use super::{required_u8, Device, DeviceKind, DeviceState, Route};

/// Number of LEDs on the stock 8x8 matrix.
pub const DEFAULT_LED_COUNT: usize = 64;

/// Setting restored by the first "on" press if nothing was set before.
pub const DEFAULT_LAST_ACTIVE: ColorSetting = ColorSetting::new(Rgb::new(255, 0, 0), 10);

/// Brightness reported before the first command; the strip driver's power-on value.
pub const DEFAULT_BRIGHTNESS: u8 = 255;

/// A colour and a brightness, applied together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSetting {
    /// Colour filled on every LED.
    pub color: Rgb,
    /// Global brightness.
    pub brightness: u8,
}

impl ColorSetting {
    /// Build a setting.
    pub const fn new(color: Rgb, brightness: u8) -> Self {
        Self { color, brightness }
    }

    /// Black at the given brightness.
    pub const fn off(brightness: u8) -> Self {
        Self::new(Rgb::BLACK, brightness)
    }
}

/// A validated matrix command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixCommand {
    /// Show a colour at a brightness.
    SetColor(ColorSetting),
}

/// Matrix state plus the strip driver.
#[derive(Debug)]
pub struct Matrix<S: LedStrip> {
    strip: S,
    current: ColorSetting,
    last_active: ColorSetting,
}

impl<S: LedStrip> Matrix<S> {
    /// A dark matrix that restores to red at brightness 10.
    pub fn new(strip: S) -> Self {
        Self::with_last_active(strip, DEFAULT_LAST_ACTIVE)
    }

    /// A dark matrix with a custom restore setting.
    pub fn with_last_active(strip: S, last_active: ColorSetting) -> Self {
        Self {
            strip,
            current: ColorSetting::off(DEFAULT_BRIGHTNESS),
            last_active,
        }
    }

    /// What the LEDs show now.
    pub fn current(&self) -> ColorSetting {
        self.current
    }

    /// What the next "on" press restores.
    pub fn last_active(&self) -> ColorSetting {
        self.last_active
    }

    /// True when the colour is black, whatever the brightness.
    pub fn is_off(&self) -> bool {
        self.current.color.is_black()
    }

    /// Show a setting.
    ///
    /// Switching from a non-zero colour to black first remembers the
    /// outgoing setting as `last_active`.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the strip fails to latch; neither the
    /// current setting nor `last_active` changes, and the strip's staged
    /// frame is put back to the current setting.
    pub fn set_color(&mut self, setting: ColorSetting) -> Result<()> {
        let last_active = if setting.color.is_black() && !self.current.color.is_black() {
            self.current
        } else {
            self.last_active
        };

        self.stage(setting);
        if let Err(err) = self.strip.show() {
            self.stage(self.current);
            return Err(Error::hardware(err));
        }

        self.last_active = last_active;
        self.current = setting;
        Ok(())
    }

    fn stage(&mut self, setting: ColorSetting) {
        self.strip.fill(setting.color);
        self.strip.set_brightness(setting.brightness);
    }

    /// Physical on/off: restore `last_active` when dark, else go black at
    /// the current brightness.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the strip fails to latch.
    pub fn toggle(&mut self) -> Result<()> {
        if self.is_off() {
            self.set_color(self.last_active)
        } else {
            self.set_color(ColorSetting::off(self.current.brightness))
        }
    }

    /// Access the strip (useful for tests).
    pub fn strip(&self) -> &S {
        &self.strip
    }

    /// Mutable access to the strip.
    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }
}

impl<S: LedStrip> Device for Matrix<S> {
    type Command = MatrixCommand;

    const KIND: DeviceKind = DeviceKind::Matrix;

    const ROUTES: &'static [Route] = &[Route::mutate("set-color"), Route::read("status")];

    fn parse_command(route: &str, params: &Params) -> Result<MatrixCommand> {
        match route {
            "set-color" => {
                let red = required_u8(params, "red")?;
                let green = required_u8(params, "green")?;
                let blue = required_u8(params, "blue")?;
                let brightness = required_u8(params, "brightness")?;
                Ok(MatrixCommand::SetColor(ColorSetting::new(
                    Rgb::new(red, green, blue),
                    brightness,
                )))
            }
            other => Err(Error::UnknownRoute(other.into())),
        }
    }

    fn apply(&mut self, command: MatrixCommand) -> Result<()> {
        match command {
            MatrixCommand::SetColor(setting) => self.set_color(setting),
        }
    }

    fn state(&mut self) -> Result<DeviceState> {
        Ok(DeviceState::Color {
            current: self.current,
            last_active: self.last_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidParameter;
    use crate::hal::MockStrip;
    use alloc::string::ToString;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn setting(r: u8, g: u8, b: u8, br: u8) -> ColorSetting {
        ColorSetting::new(Rgb::new(r, g, b), br)
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn parse_set_color() {
        let p = params(&[("red", "10"), ("green", "20"), ("blue", "30"), ("brightness", "5")]);
        assert_eq!(
            Matrix::<MockStrip>::parse_command("set-color", &p),
            Ok(MatrixCommand::SetColor(setting(10, 20, 30, 5)))
        );
    }

    #[test]
    fn parse_requires_all_four() {
        let p = params(&[("red", "10"), ("green", "20"), ("blue", "30")]);
        assert_eq!(
            Matrix::<MockStrip>::parse_command("set-color", &p),
            Err(Error::InvalidParameters(InvalidParameter::Missing("brightness")))
        );
    }

    #[test]
    fn parse_rejects_out_of_range_channel() {
        let p = params(&[("red", "256"), ("green", "0"), ("blue", "0"), ("brightness", "0")]);
        assert!(matches!(
            Matrix::<MockStrip>::parse_command("set-color", &p),
            Err(Error::InvalidParameters(InvalidParameter::OutOfRange { key: "red", .. }))
        ));
    }

    // =========================================================================
    // State
    // =========================================================================

    #[test]
    fn starts_dark_with_default_restore() {
        let matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        assert!(matrix.is_off());
        assert_eq!(matrix.last_active(), setting(255, 0, 0, 10));
    }

    #[test]
    fn set_color_drives_strip() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        assert_eq!(matrix.strip().pixel(1), Some(Rgb::new(10, 20, 30)));
        assert_eq!(matrix.strip().brightness, 5);
        assert_eq!(matrix.strip().show_count, 1);
        assert_eq!(
            matrix.state().unwrap().to_body(),
            r#"{"red": 10, "green": 20, "blue": 30, "brightness": 5}"#
        );
    }

    #[test]
    fn going_black_captures_previous() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        matrix.set_color(setting(0, 0, 0, 7)).unwrap();
        assert_eq!(matrix.last_active(), setting(10, 20, 30, 5));
        assert_eq!(matrix.current(), setting(0, 0, 0, 7));
    }

    #[test]
    fn repeated_black_keeps_capture() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        matrix.set_color(setting(0, 0, 0, 5)).unwrap();
        matrix.set_color(setting(0, 0, 0, 9)).unwrap();
        assert_eq!(matrix.last_active(), setting(10, 20, 30, 5));
    }

    #[test]
    fn non_black_does_not_touch_capture() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(1, 2, 3, 4)).unwrap();
        matrix.set_color(setting(5, 6, 7, 8)).unwrap();
        assert_eq!(matrix.last_active(), DEFAULT_LAST_ACTIVE);
    }

    #[test]
    fn toggle_off_then_on_restores() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();

        matrix.toggle().unwrap();
        assert_eq!(matrix.current(), setting(0, 0, 0, 5));

        matrix.toggle().unwrap();
        assert_eq!(matrix.current(), setting(10, 20, 30, 5));
    }

    #[test]
    fn first_toggle_restores_default() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.toggle().unwrap();
        assert_eq!(matrix.current(), DEFAULT_LAST_ACTIVE);
    }

    #[test]
    fn failed_show_changes_nothing() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        matrix.strip_mut().fail = true;

        assert!(matches!(
            matrix.set_color(setting(0, 0, 0, 5)),
            Err(Error::HardwareFault(_))
        ));
        assert_eq!(matrix.current(), setting(10, 20, 30, 5));
        assert_eq!(matrix.last_active(), DEFAULT_LAST_ACTIVE);
    }

    #[test]
    fn failed_show_restages_current_frame() {
        let mut matrix = Matrix::new(MockStrip::new(DEFAULT_LED_COUNT));
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        matrix.strip_mut().fail = true;

        assert!(matrix.set_color(setting(200, 0, 0, 90)).is_err());
        assert!(matrix.strip().pixels.iter().all(|&p| p == Rgb::new(10, 20, 30)));
        assert_eq!(matrix.strip().brightness, 5);

        // A later show latches the old frame, not the rejected one
        matrix.strip_mut().fail = false;
        matrix.set_color(setting(10, 20, 30, 5)).unwrap();
        assert_eq!(matrix.strip().pixel(0), Some(Rgb::new(10, 20, 30)));
    }
}
