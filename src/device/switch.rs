//! On/off outputs: the fan and the light controllers.
//!
//! Both are a single digital output with identical routes, so one type serves
//! both. The kind is fixed by a zero-sized marker.

use core::marker::PhantomData;

use alloc::string::ToString;

use crate::error::{Error, InvalidParameter, Result};
use crate::traits::DigitalOutput;
use crate::wire::Params;

use super::{required, Device, DeviceKind, DeviceState, Route};

/// A validated switch command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Drive the output to a level.
    Set(bool),
    /// Invert the output.
    Toggle,
}

/// Marker selecting which kind a [`Switch`] reports.
pub trait SwitchKind {
    /// Fan or light.
    const KIND: DeviceKind;
}

/// Marker for the fan controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanKind;

/// Marker for the light controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightKind;

impl SwitchKind for FanKind {
    const KIND: DeviceKind = DeviceKind::Fan;
}

impl SwitchKind for LightKind {
    const KIND: DeviceKind = DeviceKind::Light;
}

/// Fan controller over a digital output.
pub type Fan<O> = Switch<O, FanKind>;

/// Light controller over a digital output.
pub type Light<O> = Switch<O, LightKind>;

/// A digital output with a remembered level.
#[derive(Debug)]
pub struct Switch<O: DigitalOutput, K: SwitchKind = FanKind> {
    output: O,
    on: bool,
    _kind: PhantomData<K>,
}

impl<O: DigitalOutput, K: SwitchKind> Switch<O, K> {
    /// A switch that starts off. The pin is not driven until the first command.
    pub fn new(output: O) -> Self {
        Self {
            output,
            on: false,
            _kind: PhantomData,
        }
    }

    /// Current output level.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Drive the pin, then record the level.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the pin write fails.
    pub fn set(&mut self, on: bool) -> Result<()> {
        self.output.set_level(on).map_err(Error::hardware)?;
        self.on = on;
        Ok(())
    }

    /// Invert the level.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the pin write fails.
    pub fn toggle(&mut self) -> Result<()> {
        self.set(!self.on)
    }

    /// Access the output (useful for tests).
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutable access to the output.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

impl<O: DigitalOutput, K: SwitchKind> Device for Switch<O, K> {
    type Command = SwitchCommand;

    const KIND: DeviceKind = K::KIND;

    const ROUTES: &'static [Route] = &[
        Route::mutate("set-status"),
        Route::mutate("toggle"),
        Route::read("status"),
    ];

    fn parse_command(route: &str, params: &Params) -> Result<SwitchCommand> {
        match route {
            "set-status" => match required(params, "status")? {
                "on" => Ok(SwitchCommand::Set(true)),
                "off" => Ok(SwitchCommand::Set(false)),
                other => Err(InvalidParameter::Unsupported {
                    key: "status",
                    value: other.to_string(),
                }
                .into()),
            },
            "toggle" => Ok(SwitchCommand::Toggle),
            other => Err(Error::UnknownRoute(other.into())),
        }
    }

    fn apply(&mut self, command: SwitchCommand) -> Result<()> {
        match command {
            SwitchCommand::Set(on) => self.set(on),
            SwitchCommand::Toggle => self.toggle(),
        }
    }

    fn state(&mut self) -> Result<DeviceState> {
        Ok(DeviceState::Toggle { on: self.on })
    }
}
