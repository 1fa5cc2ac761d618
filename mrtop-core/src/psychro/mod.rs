//! Psychrometrics and Comfort Indices
//!
//! ## Physics Background
//!
//! ### Vapour Pressure
//!
//! Everything here starts from the saturation vapour pressure of water,
//! approximated with the Magnus formula:
//!
//! ```text
//! e_s(T) = 6.112 · exp(17.67·T / (T + 243.5))      [hPa, T in °C]
//! e      = e_s(T_air) · RH / 100
//! ```
//!
//! The vapour pressure `e` is a property of the air mass. It does not change
//! when that air touches a colder surface, which is what makes mold risk
//! computable: the same `e` divided by the lower saturation pressure at the
//! surface gives the surface RH.
//!
//! ### Derived Quantities
//!
//! | Quantity          | Relation                                          |
//! |-------------------|---------------------------------------------------|
//! | Dew point         | Magnus inversion over water                       |
//! | Frost point       | Magnus inversion over ice (below 0 °C)            |
//! | Absolute humidity | `ρ_v = 216.74 · e / T_K` (g/m³)                   |
//! | Humidity ratio    | `W = 0.622 · e / (P − e)` (kg/kg)                 |
//! | Enthalpy          | `h = 1.006·T + W·(2501 + 1.86·T)` (kJ/kg dry air) |
//! | Humidex           | `H = T + 0.5555·(e_dp − 10)`                      |
//!
//! All of them are computed from the indoor **air** temperature and RH, never
//! from the operative temperature: humidity belongs to the air mass, not to
//! the radiant environment.
//!
//! ### Mold Risk
//!
//! Mold grows where the relative humidity at a surface stays high, and the
//! coldest interior surface is usually the inside of an exterior wall. See
//! [`mold`] for the surface temperature estimate.
//!
//! ### Thermal Sensation
//!
//! PMV/PPD per ISO 7730 lives in [`pmv`].

pub mod mold;
pub mod pmv;

use core::fmt;

use libm::{expf, logf};
use serde::{Deserialize, Serialize};

use crate::constants::comfort::{
    HUMIDEX_COMFORTABLE_MAX, HUMIDEX_DANGEROUS_MAX, HUMIDEX_EVIDENT_MAX, HUMIDEX_INTENSE_MAX,
    HUMIDEX_NOTICEABLE_MAX,
};
use crate::constants::physics::{
    CP_DRY_AIR_KJ_PER_KG_K, CP_VAPOUR_KJ_PER_KG_K, DEW_POINT_A, DEW_POINT_B_C,
    DRY_AIR_DEW_POINT_C, HUMIDEX_BASE_HPA, HUMIDEX_REFERENCE_K, HUMIDEX_VAPOUR_CONSTANT_K,
    KELVIN_OFFSET, LATENT_HEAT_KJ_PER_KG, MAGNUS_A_ICE, MAGNUS_A_WATER, MAGNUS_BASE_HPA,
    MAGNUS_B_ICE_C, MAGNUS_B_WATER_C, MOLAR_MASS_RATIO, VAPOUR_DENSITY_FACTOR,
};

pub use mold::{MoldRisk, MoldRiskLevel};
pub use pmv::{PmvInputs, PmvResult};

/// Saturation vapour pressure over water (hPa)
pub fn saturation_vapor_pressure(t_c: f32) -> f32 {
    MAGNUS_BASE_HPA * expf(MAGNUS_A_WATER * t_c / (t_c + MAGNUS_B_WATER_C))
}

/// Actual vapour pressure (hPa)
pub fn vapor_pressure(t_c: f32, rh_pct: f32) -> f32 {
    saturation_vapor_pressure(t_c) * rh_pct.clamp(0.0, 100.0) / 100.0
}

/// Dew point (°C); completely dry air reports -50 °C
pub fn dew_point(t_c: f32, rh_pct: f32) -> f32 {
    if rh_pct <= 0.0 {
        return DRY_AIR_DEW_POINT_C;
    }
    let gamma = logf(rh_pct.min(100.0) / 100.0) + DEW_POINT_A * t_c / (DEW_POINT_B_C + t_c);
    DEW_POINT_B_C * gamma / (DEW_POINT_A - gamma)
}

/// Frost point (°C): the temperature at which the air's vapour saturates over ice.
///
/// Above freezing there is no frost point and the dew point is returned.
pub fn frost_point(t_c: f32, rh_pct: f32) -> f32 {
    let dp = dew_point(t_c, rh_pct);
    if dp >= 0.0 || rh_pct <= 0.0 {
        return dp;
    }
    let ln_ratio = logf(vapor_pressure(t_c, rh_pct) / MAGNUS_BASE_HPA);
    MAGNUS_B_ICE_C * ln_ratio / (MAGNUS_A_ICE - ln_ratio)
}

/// Absolute humidity (g/m³)
pub fn absolute_humidity(t_c: f32, rh_pct: f32) -> f32 {
    VAPOUR_DENSITY_FACTOR * vapor_pressure(t_c, rh_pct) / (t_c + KELVIN_OFFSET)
}

/// Humidity ratio (kg water / kg dry air) at the given total pressure
pub fn humidity_ratio(t_c: f32, rh_pct: f32, pressure_hpa: f32) -> f32 {
    let e = vapor_pressure(t_c, rh_pct);
    let dry = pressure_hpa - e;
    if dry <= 0.0 {
        return 0.0;
    }
    MOLAR_MASS_RATIO * e / dry
}

/// Specific enthalpy of moist air (kJ/kg dry air)
pub fn enthalpy(t_c: f32, rh_pct: f32, pressure_hpa: f32) -> f32 {
    let w = humidity_ratio(t_c, rh_pct, pressure_hpa);
    CP_DRY_AIR_KJ_PER_KG_K * t_c + w * (LATENT_HEAT_KJ_PER_KG + CP_VAPOUR_KJ_PER_KG_K * t_c)
}

/// Humidex from air temperature and dew point
pub fn humidex(t_c: f32, dew_point_c: f32) -> f32 {
    let e = HUMIDEX_BASE_HPA
        * expf(HUMIDEX_VAPOUR_CONSTANT_K * (1.0 / HUMIDEX_REFERENCE_K - 1.0 / (KELVIN_OFFSET + dew_point_c)));
    t_c + 0.5555 * (e - 10.0)
}

/// Thermal perception band of a humidex value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perception {
    /// Below 30
    Comfortable,
    /// 30 to 35
    NoticeableDiscomfort,
    /// 35 to 40
    EvidentDiscomfort,
    /// 40 to 46
    IntenseDiscomfort,
    /// 46 to 54
    DangerousDiscomfort,
    /// 54 and above
    HeatStrokeImminent,
}

impl Perception {
    /// Classify a humidex value
    pub fn from_humidex(h: f32) -> Self {
        if h < HUMIDEX_COMFORTABLE_MAX {
            Self::Comfortable
        } else if h < HUMIDEX_NOTICEABLE_MAX {
            Self::NoticeableDiscomfort
        } else if h < HUMIDEX_EVIDENT_MAX {
            Self::EvidentDiscomfort
        } else if h < HUMIDEX_INTENSE_MAX {
            Self::IntenseDiscomfort
        } else if h < HUMIDEX_DANGEROUS_MAX {
            Self::DangerousDiscomfort
        } else {
            Self::HeatStrokeImminent
        }
    }

    /// Text label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comfortable => "comfortable",
            Self::NoticeableDiscomfort => "noticeable_discomfort",
            Self::EvidentDiscomfort => "evident_discomfort",
            Self::IntenseDiscomfort => "intense_discomfort",
            Self::DangerousDiscomfort => "dangerous_discomfort",
            Self::HeatStrokeImminent => "heat_stroke_imminent",
        }
    }
}

impl fmt::Display for Perception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to one psychrometric evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsychroInputs {
    /// Indoor air temperature (°C)
    pub t_air: f32,
    /// Indoor relative humidity (%)
    pub rh: f32,
    /// Station pressure (hPa)
    pub pressure_hpa: f32,
    /// Outdoor dry-bulb temperature (°C)
    pub t_out: f32,
    /// Room insulation loss factor
    pub k_loss: f32,
    /// Measured wall surface temperature, if a sensor exists (°C)
    pub wall_surface_c: Option<f32>,
}

/// Psychrometric outputs for one room
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PsychroResult {
    /// Dew point (°C)
    pub dew_point: f32,
    /// Frost point (°C)
    pub frost_point: f32,
    /// Absolute humidity (g/m³)
    pub absolute_humidity: f32,
    /// Enthalpy (kJ/kg)
    pub enthalpy: f32,
    /// Humidex
    pub humidex: f32,
    /// Humidex band
    pub perception: Perception,
    /// Surface condensation / mold risk
    pub mold: MoldRisk,
}

/// Derives humidity-bound comfort metrics from air state
#[derive(Debug, Clone, Copy, Default)]
pub struct PsychrometricEngine;

impl PsychrometricEngine {
    /// Evaluate all psychrometric quantities for one room
    pub fn compute(&self, inputs: &PsychroInputs) -> PsychroResult {
        let rh = inputs.rh.clamp(0.0, 100.0);
        let dp = dew_point(inputs.t_air, rh);
        let hx = humidex(inputs.t_air, dp);
        PsychroResult {
            dew_point: dp,
            frost_point: frost_point(inputs.t_air, rh),
            absolute_humidity: absolute_humidity(inputs.t_air, rh),
            enthalpy: enthalpy(inputs.t_air, rh, inputs.pressure_hpa),
            humidex: hx,
            perception: Perception::from_humidex(hx),
            mold: mold::assess(inputs.t_air, rh, inputs.t_out, inputs.k_loss, inputs.wall_surface_c),
        }
    }
}
