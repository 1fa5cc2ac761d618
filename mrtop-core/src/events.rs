//! Input Notifications
//!
//! ## Overview
//!
//! The host delivers "a watched value changed" notifications. Each one names
//! the source that produced it, the physical quantity it carries, the value in
//! whatever unit the source reports, and whether the source is currently
//! available:
//!
//! ```text
//! Notification {
//!     source_id: "sensor.outdoor_temp",
//!     quantity:  OutdoorTemperature,
//!     value:     Number(41.0),
//!     unit:      Fahrenheit,
//!     timestamp: 1_700_000_000_000,
//!     available: true,
//! }
//! ```
//!
//! Values are normalised to canonical units on ingest (see [`Unit`]) so that
//! nothing downstream has to care about what the source reported. Weather
//! conditions, HVAC actions, fan modes, binary contacts and cover states arrive
//! as [`ReadingValue::State`].
//!
//! ## Canonical Units
//!
//! | Dimension        | Canonical |
//! |------------------|-----------|
//! | Temperature      | °C        |
//! | Speed            | m/s       |
//! | Pressure         | hPa       |
//! | Irradiance       | W/m²      |
//! | Angles           | degrees   |
//! | Humidity, cover  | %         |

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Opaque identifier of an external data source
pub type SourceId = String;

/// Physical quantity carried by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Indoor dry-bulb air temperature (°C)
    AirTemperature,
    /// Indoor relative humidity (%)
    RelativeHumidity,
    /// Outdoor dry-bulb temperature (°C)
    OutdoorTemperature,
    /// Outdoor relative humidity (%)
    OutdoorHumidity,
    /// Outdoor apparent ("feels like") temperature (°C)
    ApparentTemperature,
    /// Sustained wind speed (m/s)
    WindSpeed,
    /// Wind gust speed (m/s)
    WindGust,
    /// Global horizontal irradiance (W/m²)
    SolarIrradiance,
    /// Cloud cover (%)
    CloudCover,
    /// UV index
    UvIndex,
    /// Weather condition text such as "sunny" or "rainy"
    WeatherCondition,
    /// Precipitation rate (mm/h)
    Precipitation,
    /// Station (absolute) air pressure (hPa)
    StationPressure,
    /// Sea-level reduced air pressure (hPa)
    SeaLevelPressure,
    /// Sun elevation above the horizon (degrees)
    SunElevation,
    /// Sun azimuth, clockwise from north (degrees)
    SunAzimuth,
    /// Window contact, open = on
    WindowOpen,
    /// Door contact, open = on
    DoorOpen,
    /// HVAC action such as "heating", "cooling", "idle"
    HvacAction,
    /// Fan mode such as "low", "high", "auto"
    FanMode,
    /// Manually entered air speed (m/s)
    ManualAirSpeed,
    /// Cover position or state (%, or "open"/"closed")
    Shading,
    /// Thermostat setpoint used as radiant target (°C)
    RadiantSetpoint,
    /// Measured interior surface temperature of the exterior wall (°C)
    WallSurfaceTemperature,
}

impl QuantityKind {
    /// Every quantity, in declaration order
    pub const ALL: [QuantityKind; 24] = [
        Self::AirTemperature,
        Self::RelativeHumidity,
        Self::OutdoorTemperature,
        Self::OutdoorHumidity,
        Self::ApparentTemperature,
        Self::WindSpeed,
        Self::WindGust,
        Self::SolarIrradiance,
        Self::CloudCover,
        Self::UvIndex,
        Self::WeatherCondition,
        Self::Precipitation,
        Self::StationPressure,
        Self::SeaLevelPressure,
        Self::SunElevation,
        Self::SunAzimuth,
        Self::WindowOpen,
        Self::DoorOpen,
        Self::HvacAction,
        Self::FanMode,
        Self::ManualAirSpeed,
        Self::Shading,
        Self::RadiantSetpoint,
        Self::WallSurfaceTemperature,
    ];

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AirTemperature => "air_temperature",
            Self::RelativeHumidity => "relative_humidity",
            Self::OutdoorTemperature => "outdoor_temperature",
            Self::OutdoorHumidity => "outdoor_humidity",
            Self::ApparentTemperature => "apparent_temperature",
            Self::WindSpeed => "wind_speed",
            Self::WindGust => "wind_gust",
            Self::SolarIrradiance => "solar_irradiance",
            Self::CloudCover => "cloud_cover",
            Self::UvIndex => "uv_index",
            Self::WeatherCondition => "weather_condition",
            Self::Precipitation => "precipitation",
            Self::StationPressure => "station_pressure",
            Self::SeaLevelPressure => "sea_level_pressure",
            Self::SunElevation => "sun_elevation",
            Self::SunAzimuth => "sun_azimuth",
            Self::WindowOpen => "window_open",
            Self::DoorOpen => "door_open",
            Self::HvacAction => "hvac_action",
            Self::FanMode => "fan_mode",
            Self::ManualAirSpeed => "manual_air_speed",
            Self::Shading => "shading",
            Self::RadiantSetpoint => "radiant_setpoint",
            Self::WallSurfaceTemperature => "wall_surface_temperature",
        }
    }

    /// Get canonical unit after normalisation
    pub const fn canonical_unit(&self) -> Unit {
        match self {
            Self::AirTemperature
            | Self::OutdoorTemperature
            | Self::ApparentTemperature
            | Self::RadiantSetpoint
            | Self::WallSurfaceTemperature => Unit::Celsius,
            Self::RelativeHumidity | Self::OutdoorHumidity | Self::CloudCover | Self::Shading => {
                Unit::Percent
            }
            Self::WindSpeed | Self::WindGust | Self::ManualAirSpeed => Unit::MetersPerSecond,
            Self::SolarIrradiance => Unit::WattsPerSquareMeter,
            Self::StationPressure | Self::SeaLevelPressure => Unit::HectoPascal,
            Self::SunElevation | Self::SunAzimuth => Unit::Degrees,
            Self::Precipitation => Unit::MillimetersPerHour,
            Self::UvIndex
            | Self::WeatherCondition
            | Self::WindowOpen
            | Self::DoorOpen
            | Self::HvacAction
            | Self::FanMode => Unit::None,
        }
    }
}

impl QuantityKind {
    /// True for quantities whose states are labels even when they look numeric
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::WeatherCondition | Self::HvacAction | Self::FanMode)
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit a source reports its value in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Degrees Celsius
    Celsius,
    /// Degrees Fahrenheit
    Fahrenheit,
    /// Kelvin
    Kelvin,
    /// Percent
    Percent,
    /// Metres per second
    MetersPerSecond,
    /// Kilometres per hour
    KilometersPerHour,
    /// Miles per hour
    MilesPerHour,
    /// Watts per square metre
    WattsPerSquareMeter,
    /// Hectopascal / millibar
    HectoPascal,
    /// Pascal
    Pascal,
    /// Kilopascal
    KiloPascal,
    /// Angular degrees
    Degrees,
    /// Millimetres per hour
    MillimetersPerHour,
    /// Dimensionless or textual
    #[default]
    None,
}

impl Unit {
    /// Convert a value in this unit to the canonical unit of its dimension
    pub fn normalize(self, value: f32) -> f32 {
        match self {
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Kelvin => value - crate::constants::KELVIN_OFFSET,
            Self::KilometersPerHour => value / 3.6,
            Self::MilesPerHour => value * 0.44704,
            Self::Pascal => value / 100.0,
            Self::KiloPascal => value * 10.0,
            _ => value,
        }
    }
}

/// Raw value carried by a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Numeric reading
    Number(f32),
    /// Textual state ("sunny", "heating", "on", "closed")
    State(String),
}

impl ReadingValue {
    /// Numeric value, parsing numeric-looking states
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Number(_) => None,
            Self::State(s) => s.trim().parse::<f32>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Textual state, if this is one
    pub fn as_state(&self) -> Option<&str> {
        match self {
            Self::State(s) => Some(s.as_str()),
            Self::Number(_) => None,
        }
    }

    /// Interpret as a binary contact: `on`, `open`, `true` or non-zero
    pub fn as_binary(&self) -> Option<bool> {
        match self {
            Self::Number(v) => v.is_finite().then(|| *v != 0.0),
            Self::State(s) => match s.trim().to_ascii_lowercase().as_str() {
                "on" | "open" | "true" | "opening" => Some(true),
                "off" | "closed" | "false" | "closing" => Some(false),
                _ => None,
            },
        }
    }
}

/// A "watched value changed" notification from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Source that produced the value
    pub source_id: SourceId,
    /// Quantity the value represents
    pub quantity: QuantityKind,
    /// Reported value
    pub value: ReadingValue,
    /// Unit of the reported value
    #[serde(default)]
    pub unit: Unit,
    /// When the source produced the value
    pub timestamp: Timestamp,
    /// False when the source reports itself unavailable
    #[serde(default = "available_default")]
    pub available: bool,
}

fn available_default() -> bool {
    true
}

impl Notification {
    /// Numeric notification from an available source
    pub fn number(
        source_id: impl Into<SourceId>,
        quantity: QuantityKind,
        value: f32,
        unit: Unit,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            quantity,
            value: ReadingValue::Number(value),
            unit,
            timestamp,
            available: true,
        }
    }

    /// Textual notification from an available source
    pub fn state(
        source_id: impl Into<SourceId>,
        quantity: QuantityKind,
        state: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            quantity,
            value: ReadingValue::State(state.into()),
            unit: Unit::None,
            timestamp,
            available: true,
        }
    }

    /// Notification that the source went away
    pub fn unavailable(source_id: impl Into<SourceId>, quantity: QuantityKind, timestamp: Timestamp) -> Self {
        Self {
            source_id: source_id.into(),
            quantity,
            value: ReadingValue::State(String::from("unavailable")),
            unit: Unit::None,
            timestamp,
            available: false,
        }
    }

    /// The value converted to its canonical unit
    pub fn normalized(&self) -> ReadingValue {
        match &self.value {
            ReadingValue::Number(v) => ReadingValue::Number(self.unit.normalize(*v)),
            ReadingValue::State(s) if self.quantity.is_textual() => ReadingValue::State(s.clone()),
            ReadingValue::State(s) => match s.trim().parse::<f32>() {
                Ok(v) if v.is_finite() => ReadingValue::Number(self.unit.normalize(v)),
                _ => ReadingValue::State(s.clone()),
            },
        }
    }
}
