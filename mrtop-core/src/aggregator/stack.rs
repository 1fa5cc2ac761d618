//! Stack effect and vertical stratification
//!
//! Warm air inside a building is lighter than the cold air outside. The
//! resulting pressure difference across the envelope grows with height:
//!
//! ```text
//! ΔP = C · P_atm · h · (1/T_out − 1/T_in)      C = 0.0342 K/m, T in kelvin
//! ```
//!
//! Positive ΔP pushes air out at the top of the building and draws it in at
//! the bottom. In summer, with a hotter outdoor temperature, the sign flips.

use crate::constants::physics::{KELVIN_OFFSET, STACK_EFFECT_COEFF};

/// Stack-effect pressure difference (Pa) over `height_m`
pub fn stack_effect_pressure(t_in_c: f32, t_out_c: f32, height_m: f32, p_atm_pa: f32) -> f32 {
    let t_in_k = t_in_c + KELVIN_OFFSET;
    let t_out_k = t_out_c + KELVIN_OFFSET;
    if t_in_k <= 0.0 || t_out_k <= 0.0 {
        return 0.0;
    }
    STACK_EFFECT_COEFF * p_atm_pa * height_m.max(0.0) * (1.0 / t_out_k - 1.0 / t_in_k)
}

/// Temperature change per floor level (°C/level)
pub fn stratification_per_level(t_low: f32, t_high: f32, levels: i32) -> f32 {
    if levels <= 0 {
        return 0.0;
    }
    (t_high - t_low) / levels as f32
}
