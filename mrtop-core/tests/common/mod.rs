//! Shared builders for integration tests
//!
//! Rooms are wired to the sources a typical installation has: an indoor
//! thermometer and hygrometer per room, plus one outdoor sensor and one
//! weather service shared by the whole home.

#![allow(dead_code)]

use mrtop_core::{
    Notification, QuantityKind, RoomConfig, RoomId, SourceBinding, Unit,
};
use mrtop_core::time::Timestamp;

pub const OUTDOOR: &str = "sensor.outdoor";
pub const WEATHER: &str = "weather.home";
pub const SUN: &str = "sun.sun";

pub const MINUTE: Timestamp = 60_000;

/// Indoor source ids for a room
pub fn air_id(room: u32) -> String {
    format!("sensor.room{}_temperature", room)
}

pub fn rh_id(room: u32) -> String {
    format!("sensor.room{}_humidity", room)
}

/// Room wired to its own indoor sensors and the shared outdoor sources
pub fn room_config(id: u32, floor_level: i32) -> RoomConfig {
    let mut cfg = RoomConfig::new(RoomId(id), format!("Room {}", id))
        .with_source(QuantityKind::AirTemperature, SourceBinding::new(air_id(id)))
        .with_source(QuantityKind::RelativeHumidity, SourceBinding::new(rh_id(id)))
        .with_source(QuantityKind::OutdoorTemperature, SourceBinding::new(OUTDOOR))
        .with_source(QuantityKind::OutdoorTemperature, SourceBinding::new(WEATHER))
        .with_source(QuantityKind::OutdoorHumidity, SourceBinding::new(WEATHER))
        .with_source(QuantityKind::WindSpeed, SourceBinding::new(WEATHER))
        .with_source(QuantityKind::WeatherCondition, SourceBinding::new(WEATHER))
        .with_source(QuantityKind::UvIndex, SourceBinding::new(WEATHER))
        .with_source(QuantityKind::SunElevation, SourceBinding::new(SUN))
        .with_source(QuantityKind::SunAzimuth, SourceBinding::new(SUN));
    cfg.floor_level = floor_level;
    cfg
}

/// Outdoor conditions at one instant
#[derive(Debug, Clone, Copy)]
pub struct Weather {
    pub t_out: f32,
    pub rh_out: f32,
    pub wind_ms: f32,
    pub uv: f32,
    pub sun_elevation: f32,
    pub sun_azimuth: f32,
    pub condition: &'static str,
}

impl Weather {
    pub fn winter_night() -> Self {
        Self {
            t_out: -5.0,
            rh_out: 80.0,
            wind_ms: 6.0,
            uv: 0.0,
            sun_elevation: -20.0,
            sun_azimuth: 0.0,
            condition: "clear-night",
        }
    }

    pub fn summer_noon() -> Self {
        Self {
            t_out: 28.0,
            rh_out: 40.0,
            wind_ms: 1.0,
            uv: 8.0,
            sun_elevation: 55.0,
            sun_azimuth: 180.0,
            condition: "sunny",
        }
    }

    /// Notifications a weather integration would send
    pub fn notifications(&self, at: Timestamp) -> Vec<Notification> {
        vec![
            Notification::number(OUTDOOR, QuantityKind::OutdoorTemperature, self.t_out, Unit::Celsius, at),
            Notification::number(WEATHER, QuantityKind::OutdoorHumidity, self.rh_out, Unit::Percent, at),
            Notification::number(WEATHER, QuantityKind::WindSpeed, self.wind_ms, Unit::MetersPerSecond, at),
            Notification::number(WEATHER, QuantityKind::UvIndex, self.uv, Unit::None, at),
            Notification::state(WEATHER, QuantityKind::WeatherCondition, self.condition, at),
            Notification::number(SUN, QuantityKind::SunElevation, self.sun_elevation, Unit::Degrees, at),
            Notification::number(SUN, QuantityKind::SunAzimuth, self.sun_azimuth, Unit::Degrees, at),
        ]
    }
}

/// Indoor readings for one room
pub fn indoor(room: u32, t_air: f32, rh: f32, at: Timestamp) -> Vec<Notification> {
    vec![
        Notification::number(rh_id(room), QuantityKind::RelativeHumidity, rh, Unit::Percent, at),
        Notification::number(air_id(room), QuantityKind::AirTemperature, t_air, Unit::Celsius, at),
    ]
}
