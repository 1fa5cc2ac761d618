//! Heuristic estimates used when no source reports a quantity
//!
//! Every function here is pure. The resolver decides when to call them and
//! where their inputs come from.

use libm::{cosf, fabsf, powf};

use crate::constants::comfort::{FAN_SPEED_HIGH, FAN_SPEED_LOW, FAN_SPEED_MEDIUM, AIR_SPEED_HVAC};
use crate::constants::physics::{
    BAROMETRIC_EXPONENT, BAROMETRIC_HEIGHT_COEFF_PER_M, CLOUD_ATTENUATION,
    DAYLIGHT_FULL_ELEVATION_DEG, DIFFUSE_INCIDENCE, RAIN_MULTIPLIER,
    SOLAR_DAYLIGHT_BASE_W_PER_M2, SOLAR_HEURISTIC_CAP_W_PER_M2, SOLAR_PER_UV_INDEX_W_PER_M2,
    STEADMAN_OFFSET_C, STEADMAN_VAPOUR_COEFF, STEADMAN_WIND_COEFF,
};
use crate::psychro::saturation_vapor_pressure;

/// Steadman apparent temperature for shaded outdoor conditions (°C).
///
/// `AT = T + 0.33·e − 0.70·ws − 4.0` with `e` the vapour pressure in hPa.
pub fn steadman_apparent(t_out: f32, rh_out: f32, wind_ms: f32) -> f32 {
    let e = saturation_vapor_pressure(t_out) * rh_out.clamp(0.0, 100.0) / 100.0;
    t_out + STEADMAN_VAPOUR_COEFF * e - STEADMAN_WIND_COEFF * wind_ms.max(0.0) - STEADMAN_OFFSET_C
}

/// Approximate cloud cover (%) for a weather condition string.
///
/// Returns `None` for conditions that say nothing about the sky.
pub fn cloud_from_condition(condition: &str) -> Option<f32> {
    let cover = match condition.trim().to_ascii_lowercase().as_str() {
        "sunny" | "clear" | "clear-night" => 0.0,
        "windy" => 30.0,
        "partlycloudy" | "partly-cloudy" | "partly_cloudy" => 50.0,
        "windy-variant" => 60.0,
        "cloudy" | "rainy" | "snowy" | "lightning" => 90.0,
        "snowy-rainy" | "lightning-rainy" => 95.0,
        "fog" | "pouring" | "hail" => 100.0,
        _ => return None,
    };
    Some(cover)
}

/// True if the condition describes falling precipitation
pub fn is_wet_condition(condition: &str) -> bool {
    let c = condition.to_ascii_lowercase();
    ["rain", "pour", "snow", "hail"].iter().any(|w| c.contains(w))
}

/// Irradiance multiplier for precipitation
pub fn rain_multiplier(wet: bool) -> f32 {
    if wet {
        RAIN_MULTIPLIER
    } else {
        1.0
    }
}

/// Fraction of full daylight for a sun elevation, zero at or below the horizon
pub fn daylight_factor(elevation_deg: f32) -> f32 {
    if elevation_deg.is_nan() || elevation_deg <= 0.0 {
        return 0.0;
    }
    (elevation_deg / DAYLIGHT_FULL_ELEVATION_DEG).clamp(0.0, 1.0)
}

/// Irradiance remaining under a given cloud cover (fraction)
pub fn cloud_factor(cloud_pct: f32) -> f32 {
    (1.0 - CLOUD_ATTENUATION * cloud_pct.clamp(0.0, 100.0) / 100.0).max(0.0)
}

/// Irradiance estimate from weather data (W/m²), capped at the clear-sky ceiling.
///
/// The base comes from the UV index when one is reported, otherwise from
/// daylight alone; cloud, precipitation and daylight then scale it down.
pub fn solar_estimate(uv_index: f32, cloud_pct: f32, rain_mult: f32, daylight: f32) -> f32 {
    if daylight <= 0.0 {
        return 0.0;
    }
    let base = if uv_index > 0.0 {
        SOLAR_PER_UV_INDEX_W_PER_M2 * uv_index
    } else {
        SOLAR_DAYLIGHT_BASE_W_PER_M2 * daylight
    };
    (base * cloud_factor(cloud_pct) * rain_mult * daylight).clamp(0.0, SOLAR_HEURISTIC_CAP_W_PER_M2)
}

/// Station pressure from a sea-level pressure and site elevation (hPa)
pub fn station_pressure(sea_level_hpa: f32, elevation_m: f32) -> f32 {
    let ratio = (1.0 - BAROMETRIC_HEIGHT_COEFF_PER_M * elevation_m).max(0.0);
    sea_level_hpa * powf(ratio, BAROMETRIC_EXPONENT)
}

/// Air speed implied by a fan mode (m/s).
///
/// `None` means the fan is off. Unrecognised modes use the HVAC default.
pub fn fan_mode_speed(mode: &str) -> Option<f32> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "low" | "1" | "quiet" => Some(FAN_SPEED_LOW),
        "medium" | "med" | "middle" | "2" => Some(FAN_SPEED_MEDIUM),
        "high" | "3" | "turbo" => Some(FAN_SPEED_HIGH),
        _ => Some(AIR_SPEED_HVAC),
    }
}

/// Solar angle-of-incidence factor for a window (0.1–1.0).
///
/// Direct sun contributes `cos(Δaz) + 0.1` while the sun is within 90° of the
/// window normal; behind the facade only diffuse light remains.
pub fn incidence_factor(sun_azimuth_deg: Option<f32>, orientation_deg: f32) -> f32 {
    let azimuth = match sun_azimuth_deg {
        Some(a) if a.is_finite() => a,
        _ => return DIFFUSE_INCIDENCE,
    };
    let mut diff = fabsf(azimuth - orientation_deg) % 360.0;
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    if diff >= 90.0 {
        return DIFFUSE_INCIDENCE;
    }
    (cosf(diff.to_radians()) + DIFFUSE_INCIDENCE).min(1.0)
}
