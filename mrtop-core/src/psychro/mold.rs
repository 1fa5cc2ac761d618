//! Surface humidity and mold risk
//!
//! The inside face of an exterior wall sits between air and outdoor
//! temperature. A poorly insulated wall (high `k_loss`) lets more of the
//! temperature drop happen across its inner surface:
//!
//! ```text
//! T_surface = T_air − max(ΔT, 0) · min(1, 2.5·k_loss)
//! RH_surface = e(T_air, RH) / e_s(T_surface)
//! ```
//!
//! A wall-surface sensor replaces the estimate when one is configured.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::comfort::{MOLD_CRITICAL_RH_PCT, MOLD_WARNING_RH_PCT};
use crate::constants::physics::K_LOSS_TO_SURFACE_FRACTION;

use super::{saturation_vapor_pressure, vapor_pressure};

/// Mold risk category from surface RH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoldRiskLevel {
    /// Below 65% surface RH
    Low,
    /// 65% to 80% surface RH
    Warning,
    /// Above 80% surface RH
    Critical,
}

impl MoldRiskLevel {
    /// Classify a surface relative humidity (%)
    pub fn classify(surface_rh: f32) -> Self {
        if surface_rh > MOLD_CRITICAL_RH_PCT {
            Self::Critical
        } else if surface_rh >= MOLD_WARNING_RH_PCT {
            Self::Warning
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for MoldRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Warning => "warning",
            Self::Critical => "critical",
        })
    }
}

/// Mold assessment for the coldest exterior-wall surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoldRisk {
    /// Surface temperature used (°C)
    pub surface_temp: f32,
    /// True if `surface_temp` came from a sensor
    pub surface_measured: bool,
    /// Relative humidity at the surface (%)
    pub surface_rh: f32,
    /// Category
    pub level: MoldRiskLevel,
}

/// Estimated interior surface temperature of an exterior wall (°C)
pub fn surface_temperature(t_air: f32, t_out: f32, k_loss: f32) -> f32 {
    let fraction = (k_loss * K_LOSS_TO_SURFACE_FRACTION).clamp(0.0, 1.0);
    t_air - (t_air - t_out).max(0.0) * fraction
}

/// Relative humidity the room air would have at `surface_c` (%, clamped to 0–100)
pub fn surface_rh(t_air: f32, rh: f32, surface_c: f32) -> f32 {
    let saturation = saturation_vapor_pressure(surface_c);
    if saturation.is_nan() || saturation <= 0.0 {
        return 100.0;
    }
    (vapor_pressure(t_air, rh) / saturation * 100.0).clamp(0.0, 100.0)
}

/// Assess mold risk from room air state and wall conditions
pub fn assess(t_air: f32, rh: f32, t_out: f32, k_loss: f32, measured_surface: Option<f32>) -> MoldRisk {
    let (surface_temp, surface_measured) = match measured_surface {
        Some(t) if t.is_finite() => (t, true),
        _ => (surface_temperature(t_air, t_out, k_loss), false),
    };
    let surface_rh = surface_rh(t_air, rh, surface_temp);
    MoldRisk {
        surface_temp,
        surface_measured,
        surface_rh,
        level: MoldRiskLevel::classify(surface_rh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_bands() {
        assert_eq!(MoldRiskLevel::classify(50.0), MoldRiskLevel::Low);
        assert_eq!(MoldRiskLevel::classify(70.0), MoldRiskLevel::Warning);
        assert_eq!(MoldRiskLevel::classify(85.0), MoldRiskLevel::Critical);
        assert_eq!(MoldRiskLevel::classify(65.0), MoldRiskLevel::Warning);
        assert_eq!(MoldRiskLevel::classify(80.0), MoldRiskLevel::Warning);
    }

    #[test]
    fn worse_insulation_means_colder_surface() {
        let good = surface_temperature(20.0, 0.0, 0.05);
        let poor = surface_temperature(20.0, 0.0, 0.3);
        assert!((good - 17.5).abs() < 1e-4);
        assert!(poor < good);
        // a summer day never cools the wall below the air
        assert_eq!(surface_temperature(20.0, 30.0, 0.2), 20.0);
        // fraction saturates at 1
        assert_eq!(surface_temperature(20.0, -10.0, 0.8), -10.0);
    }

    #[test]
    fn surface_rh_equals_room_rh_without_gradient() {
        assert!((surface_rh(20.0, 55.0, 20.0) - 55.0).abs() < 1e-3);
        assert_eq!(surface_rh(20.0, 90.0, 0.0), 100.0);
    }

    #[test]
    fn wall_sensor_overrides_estimate() {
        let risk = assess(20.0, 50.0, -5.0, 0.2, Some(19.0));
        assert!(risk.surface_measured);
        assert_eq!(risk.surface_temp, 19.0);
        assert_eq!(risk.level, MoldRiskLevel::Low);

        let estimated = assess(20.0, 50.0, -5.0, 0.2, None);
        assert!(!estimated.surface_measured);
        assert!(estimated.surface_rh > risk.surface_rh);
    }
}
