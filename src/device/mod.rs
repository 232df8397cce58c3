//! Devices: the state each controller owns and the commands it accepts.
//!
//! A device bundles its observable state with the hardware handle that
//! makes that state physical. Commands are parsed and validated into a typed
//! value *before* the shared state is locked, so a rejected request can
//! never leave a half-applied mutation behind.
//!
//! | Device | Routes | State |
//! |--------|--------|-------|
//! | [`Blinds`] | `position` (POST), `status` (GET) | [`DeviceState::Position`] |
//! | [`Switch`] | `set-status`, `toggle` (POST), `status` (GET) | [`DeviceState::Toggle`] |
//! | [`Matrix`] | `set-color` (POST), `status` (GET) | [`DeviceState::Color`] |
//! | [`Sensor`] | `reading` (GET) | [`DeviceState::Reading`] |

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

use crate::error::{Error, InvalidParameter, Result};
use crate::traits::{Measurement, Rgb};
use crate::wire::{Params, Verb};

pub mod blinds;
pub mod matrix;
pub mod sensor;
pub mod switch;

pub use blinds::{Blinds, BlindsCommand};
pub use matrix::{ColorSetting, Matrix, MatrixCommand};
pub use sensor::{Sensor, SensorCommand};
pub use switch::{Fan, FanKind, Light, LightKind, Switch, SwitchCommand, SwitchKind};

// ============================================================================
// Device Kind
// ============================================================================

/// The five controller flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DeviceKind {
    /// Servo-driven blinds with a potentiometer and button.
    Blinds,
    /// Fan on a digital output with a toggle button.
    Fan,
    /// Light on a digital output with a toggle button.
    Light,
    /// RGB LED matrix with an on/off button.
    Matrix,
    /// Read-only temperature/humidity sensor.
    Sensor,
}

impl DeviceKind {
    /// Every kind, in address order of the default deployment.
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::Sensor,
        DeviceKind::Fan,
        DeviceKind::Matrix,
        DeviceKind::Blinds,
        DeviceKind::Light,
    ];

    /// Lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Blinds => "blinds",
            DeviceKind::Fan => "fan",
            DeviceKind::Light => "light",
            DeviceKind::Matrix => "matrix",
            DeviceKind::Sensor => "sensor",
        }
    }

    /// Parse a kind from its name. Accepts a few aliases.
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blinds" | "blind" => Some(DeviceKind::Blinds),
            "fan" => Some(DeviceKind::Fan),
            "light" | "led" => Some(DeviceKind::Light),
            "matrix" | "rgb" | "rgb-matrix" => Some(DeviceKind::Matrix),
            "sensor" | "temperature" | "dht" => Some(DeviceKind::Sensor),
            _ => None,
        }
    }

    /// Whether this kind runs an input poller alongside the server.
    pub const fn has_physical_input(&self) -> bool {
        !matches!(self, DeviceKind::Sensor)
    }

    /// Last octet of the static address used by the default deployment.
    pub const fn default_host_octet(&self) -> u8 {
        match self {
            DeviceKind::Sensor => 250,
            DeviceKind::Fan => 251,
            DeviceKind::Matrix => 252,
            DeviceKind::Blinds => 253,
            DeviceKind::Light => 254,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Routes
// ============================================================================

/// What a route does to the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Produce the current state as a body. Requires `GET`.
    Read,
    /// Apply a command. Requires `POST`.
    Mutate,
}

/// One entry of a device's route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    /// Path segment, without the leading slash.
    pub name: &'static str,
    /// Read or mutate.
    pub action: Action,
}

impl Route {
    /// A `GET` route returning the state.
    pub const fn read(name: &'static str) -> Self {
        Self {
            name,
            action: Action::Read,
        }
    }

    /// A `POST` route applying a command.
    pub const fn mutate(name: &'static str) -> Self {
        Self {
            name,
            action: Action::Mutate,
        }
    }

    /// The only verb this route accepts.
    pub fn verb(&self) -> Verb {
        match self.action {
            Action::Read => Verb::Get,
            Action::Mutate => Verb::Post,
        }
    }
}

// ============================================================================
// Device State
// ============================================================================

/// Snapshot of a device's observable state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum DeviceState {
    /// Blinds position as a fraction in `[0, 1]`.
    Position {
        /// 0.0 = closed, 1.0 = fully open.
        percent: f32,
    },
    /// Fan or light output.
    Toggle {
        /// Output level.
        on: bool,
    },
    /// Matrix colour plus the colour an "on" press restores.
    Color {
        /// What the LEDs show now.
        current: ColorSetting,
        /// Last non-zero colour, restored by the physical toggle.
        last_active: ColorSetting,
    },
    /// A fresh sensor measurement.
    Reading(Measurement),
}

impl DeviceState {
    /// Render the state as a read-route body.
    ///
    /// - `Position`: percentage 0-100, integer when whole (`55`, `37.5`)
    /// - `Toggle`: `1` or `0`
    /// - `Color`: `{"red": 10, "green": 20, "blue": 30, "brightness": 5}`
    /// - `Reading`: `{"temperature": 21.5, "humidity": 40}`
    pub fn to_body(&self) -> String {
        match self {
            DeviceState::Position { percent } => format_percentage(*percent),
            DeviceState::Toggle { on } => if *on { "1" } else { "0" }.to_string(),
            DeviceState::Color { current, .. } => color_json(current.color, current.brightness),
            DeviceState::Reading(m) => format!(
                r#"{{"temperature": {}, "humidity": {}}}"#,
                m.temperature, m.humidity
            ),
        }
    }
}

fn color_json(color: Rgb, brightness: u8) -> String {
    format!(
        r#"{{"red": {}, "green": {}, "blue": {}, "brightness": {}}}"#,
        color.red, color.green, color.blue, brightness
    )
}

/// Format a `[0, 1]` fraction as a percentage with at most two decimals.
pub fn format_percentage(percent: f32) -> String {
    let clamped = percent.clamp(0.0, 1.0);
    // Rounded hundredths of a percent; manual rounding keeps this `no_std`.
    let hundredths = (clamped * 10_000.0 + 0.5) as u32;
    let whole = hundredths / 100;
    let frac = hundredths % 100;
    if frac == 0 {
        format!("{whole}")
    } else if frac % 10 == 0 {
        format!("{whole}.{}", frac / 10)
    } else {
        format!("{whole}.{frac:02}")
    }
}

// ============================================================================
// Device Trait
// ============================================================================

/// A controllable device.
///
/// Implementations provide a static route table, a pure parser that turns a
/// route plus parameters into a validated command, and the two operations
/// that run inside the shared-state guard.
pub trait Device {
    /// Validated mutation accepted by this device.
    type Command: fmt::Debug;

    /// Which controller flavour this is.
    const KIND: DeviceKind;

    /// Every route this device serves.
    const ROUTES: &'static [Route];

    /// Parse and validate the parameters of a mutating route.
    ///
    /// Runs outside the guard and must not depend on the current state.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameters`] for missing, unparsable or out-of-range
    /// values; [`Error::UnknownRoute`] if `route` is not a mutating route.
    fn parse_command(route: &str, params: &Params) -> Result<Self::Command>;

    /// Apply a validated command, driving the hardware.
    ///
    /// State is only updated once the hardware write has succeeded.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the driver fails.
    fn apply(&mut self, command: Self::Command) -> Result<()>;

    /// Produce the current state. The sensor performs a fresh acquisition.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if an acquisition fails.
    fn state(&mut self) -> Result<DeviceState>;

    /// Look up a route by name.
    fn route(name: &str) -> Option<&'static Route> {
        Self::ROUTES.iter().find(|r| r.name == name)
    }
}

// ============================================================================
// Parameter Helpers
// ============================================================================

/// Fetch a required parameter.
pub(crate) fn required<'a>(params: &'a Params, key: &'static str) -> Result<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or(Error::InvalidParameters(InvalidParameter::Missing(key)))
}

/// Fetch a required integer parameter within `[min, max]`.
pub(crate) fn required_int(params: &Params, key: &'static str, min: i64, max: i64) -> Result<i64> {
    let raw = required(params, key)?;
    let value: i64 = raw.parse().map_err(|_| InvalidParameter::NotANumber {
        key,
        value: raw.to_string(),
    })?;
    if value < min || value > max {
        return Err(InvalidParameter::OutOfRange {
            key,
            value,
            min,
            max,
        }
        .into());
    }
    Ok(value)
}

/// Fetch a required `u8` parameter (0-255).
pub(crate) fn required_u8(params: &Params, key: &'static str) -> Result<u8> {
    let value = required_int(params, key, 0, i64::from(u8::MAX))?;
    // Range checked above.
    Ok(value as u8)
}
