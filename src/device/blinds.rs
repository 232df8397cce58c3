//! Servo-driven blinds.
//!
//! The blinds position is a fraction in `[0, 1]` mapped linearly onto a servo
//! duty range:
//!
//! ```text
//! duty = min_duty + (max_duty - min_duty) * percent
//! ```
//!
//! The position can be set remotely (`POST /position?percentage=N`, integer
//! 0-100) or physically by the potentiometer, sampled while the button is
//! pressed.

use crate::error::{Error, Result};
use crate::traits::PwmOutput;
use crate::wire::Params;

use super::{required_int, Device, DeviceKind, DeviceState, Route};

/// Servo duty (u16 scale) at 0 %.
pub const DEFAULT_MIN_DUTY: u16 = 1400;
/// Servo duty (u16 scale) at 100 %.
pub const DEFAULT_MAX_DUTY: u16 = 7700;

/// A validated blinds command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlindsCommand {
    /// Move to a position in `[0, 1]`.
    SetPosition(f32),
}

/// Blinds state plus the servo that moves them.
#[derive(Debug)]
pub struct Blinds<P: PwmOutput> {
    servo: P,
    percent: f32,
    min_duty: u16,
    max_duty: u16,
}

impl<P: PwmOutput> Blinds<P> {
    /// Blinds at 0 % with the default duty range.
    ///
    /// The servo is not moved until the first command.
    pub fn new(servo: P) -> Self {
        Self::with_duty_range(servo, DEFAULT_MIN_DUTY, DEFAULT_MAX_DUTY)
    }

    /// Blinds at 0 % with a custom duty range.
    pub fn with_duty_range(servo: P, min_duty: u16, max_duty: u16) -> Self {
        Self {
            servo,
            percent: 0.0,
            min_duty,
            max_duty,
        }
    }

    /// Current position in `[0, 1]`.
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Duty cycle for a position. Values outside `[0, 1]` are clamped.
    pub fn duty_for(&self, percent: f32) -> u16 {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 1.0)
        };
        let span = f32::from(self.max_duty) - f32::from(self.min_duty);
        (f32::from(self.min_duty) + span * percent) as u16
    }

    /// Move the servo, then record the new position.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the PWM write fails; the stored position
    /// is left unchanged.
    pub fn set_percent(&mut self, percent: f32) -> Result<()> {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 1.0)
        };
        let duty = self.duty_for(percent);
        self.servo.set_duty_u16(duty).map_err(Error::hardware)?;
        self.percent = percent;
        Ok(())
    }

    /// Stop driving the servo (duty 0) without changing the stored position.
    ///
    /// Done once at boot so the servo holds still until the first command.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the PWM write fails.
    pub fn release(&mut self) -> Result<()> {
        self.servo.set_duty_u16(0).map_err(Error::hardware)
    }

    /// Access the servo (useful for tests).
    pub fn servo(&self) -> &P {
        &self.servo
    }

    /// Mutable access to the servo.
    pub fn servo_mut(&mut self) -> &mut P {
        &mut self.servo
    }
}

impl<P: PwmOutput> Device for Blinds<P> {
    type Command = BlindsCommand;

    const KIND: DeviceKind = DeviceKind::Blinds;

    const ROUTES: &'static [Route] = &[Route::mutate("position"), Route::read("status")];

    fn parse_command(route: &str, params: &Params) -> Result<BlindsCommand> {
        match route {
            "position" => {
                let value = required_int(params, "percentage", 0, 100)?;
                Ok(BlindsCommand::SetPosition(value as f32 / 100.0))
            }
            other => Err(Error::UnknownRoute(other.into())),
        }
    }

    fn apply(&mut self, command: BlindsCommand) -> Result<()> {
        match command {
            BlindsCommand::SetPosition(percent) => self.set_percent(percent),
        }
    }

    fn state(&mut self) -> Result<DeviceState> {
        Ok(DeviceState::Position {
            percent: self.percent,
        })
    }
}
