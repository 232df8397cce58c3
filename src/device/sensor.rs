//! Read-only temperature/humidity sensor.
//!
//! Every `GET /reading` performs a fresh acquisition; nothing is cached, so a
//! failed acquisition is always reported as a 500 rather than masked by an
//! older value.

use crate::error::{Error, Result};
use crate::traits::ClimateSensor;
use crate::wire::Params;

use super::{Device, DeviceKind, DeviceState, Route};

/// The sensor accepts no commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorCommand {}

/// A climate sensor exposed as a device.
#[derive(Debug)]
pub struct Sensor<C: ClimateSensor> {
    sensor: C,
}

impl<C: ClimateSensor> Sensor<C> {
    /// Wrap a sensor driver.
    pub fn new(sensor: C) -> Self {
        Self { sensor }
    }

    /// Access the driver (useful for tests).
    pub fn sensor(&self) -> &C {
        &self.sensor
    }

    /// Mutable access to the driver.
    pub fn sensor_mut(&mut self) -> &mut C {
        &mut self.sensor
    }
}

impl<C: ClimateSensor> Device for Sensor<C> {
    type Command = SensorCommand;

    const KIND: DeviceKind = DeviceKind::Sensor;

    const ROUTES: &'static [Route] = &[Route::read("reading")];

    fn parse_command(route: &str, _params: &Params) -> Result<SensorCommand> {
        Err(Error::UnknownRoute(route.into()))
    }

    fn apply(&mut self, command: SensorCommand) -> Result<()> {
        match command {}
    }

    fn state(&mut self) -> Result<DeviceState> {
        self.sensor
            .read()
            .map(DeviceState::Reading)
            .map_err(Error::hardware)
    }
}
