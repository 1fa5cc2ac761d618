//! Convective/radiative weighting and operative temperature
//!
//! Operative temperature blends air and mean radiant temperature by how the
//! body exchanges heat with each:
//!
//! ```text
//! h_c = 3.1                     v ≤ 0.1 m/s   (natural convection)
//! h_c = 3.1 + 5.6 · v^0.6       v > 0.1 m/s   (forced convection)
//! A   = h_r / (h_c + h_r)       h_r = 4.7 W/(m²·K)
//! Top = A · MRT + (1 − A) · T_air
//! ```
//!
//! Still air gives `A ≈ 0.6`; a strong draft shifts the weight toward the
//! air temperature.

use libm::powf;

use crate::constants::physics::{
    FALLBACK_RADIANT_WEIGHT, H_CONVECTIVE_FORCED_COEFF, H_CONVECTIVE_FORCED_EXPONENT,
    H_CONVECTIVE_STILL_W_PER_M2K, H_RADIATIVE_W_PER_M2K, STILL_AIR_THRESHOLD_M_PER_S,
};

/// Convective heat transfer coefficient for a given air speed (W/(m²·K))
pub fn convective_coefficient(air_speed: f32) -> f32 {
    if air_speed <= STILL_AIR_THRESHOLD_M_PER_S {
        H_CONVECTIVE_STILL_W_PER_M2K
    } else {
        H_CONVECTIVE_STILL_W_PER_M2K + H_CONVECTIVE_FORCED_COEFF * powf(air_speed, H_CONVECTIVE_FORCED_EXPONENT)
    }
}

/// Radiant weighting factor `h_r / (h_c + h_r)`.
///
/// Returns the weight and whether the fallback of 0.5 had to be used.
pub fn radiant_weight(h_c: f32, h_r: f32) -> (f32, bool) {
    let denom = h_c + h_r;
    if !denom.is_finite() || denom <= 0.0 {
        return (FALLBACK_RADIANT_WEIGHT, true);
    }
    let a = h_r / denom;
    if a.is_finite() {
        (a.clamp(0.0, 1.0), false)
    } else {
        (FALLBACK_RADIANT_WEIGHT, true)
    }
}

/// Radiant weighting for an air speed using the standard `h_r`
pub fn radiant_weight_for_speed(air_speed: f32) -> (f32, f32, bool) {
    let h_c = convective_coefficient(air_speed);
    let (a, degenerate) = radiant_weight(h_c, H_RADIATIVE_W_PER_M2K);
    (h_c, a, degenerate)
}

/// Operative temperature
pub fn operative_temperature(a_radiant: f32, mrt: f32, t_air: f32) -> f32 {
    a_radiant * mrt + (1.0 - a_radiant) * t_air
}
