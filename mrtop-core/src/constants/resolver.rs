//! Resolver Fallback Constants
//!
//! The value each quantity takes when no source, attribute or heuristic can
//! supply one.

/// Outdoor temperature with no data at all (°C).
pub const DEFAULT_OUTDOOR_TEMP_C: f32 = 10.0;

/// Indoor air temperature placeholder (°C); cycles using it are skipped.
pub const DEFAULT_AIR_TEMP_C: f32 = 22.0;

/// Cloud cover when neither sensor, attribute nor condition is known (%).
pub const DEFAULT_CLOUD_COVER_PCT: f32 = 50.0;

/// UV index when unknown.
pub const DEFAULT_UV_INDEX: f32 = 0.0;

/// Wind speed when unknown (m/s).
pub const DEFAULT_WIND_SPEED_M_PER_S: f32 = 0.0;

/// Sun elevation when unknown (degrees); zero means no daylight.
pub const DEFAULT_SUN_ELEVATION_DEG: f32 = 0.0;

/// Precipitation rate when unknown (mm/h).
pub const DEFAULT_PRECIPITATION_MM_PER_H: f32 = 0.0;

/// Shading factor when no cover is configured (1 = unshaded).
pub const DEFAULT_SHADING: f32 = 1.0;

/// Radiant target when no thermostat setpoint is available (°C).
pub const DEFAULT_SETPOINT_C: f32 = 24.0;

/// Default window orientation (degrees, facing south).
pub const DEFAULT_ORIENTATION_DEG: f32 = 180.0;

/// Default floor area used as aggregation weight (m²).
pub const DEFAULT_ROOM_AREA_M2: f32 = 15.0;
