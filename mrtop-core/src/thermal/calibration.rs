//! Insulation calibration from a wall surface sensor
//!
//! With the sun down and a large indoor/outdoor difference, the inner wall
//! surface temperature reveals how much of ΔT falls across the interior film,
//! which inverts the surface model used for mold risk:
//!
//! ```text
//! k_loss ≈ (T_air − T_wall) / (ΔT · 2.5)
//! ```

use serde::Serialize;

use crate::constants::comfort::CALIBRATION_MIN_DELTA_C;
use crate::constants::physics::K_LOSS_TO_SURFACE_FRACTION;

/// Outcome of an insulation calibration attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Calibration {
    /// Estimated loss factor (0–1)
    Estimated {
        /// Suggested `k_loss`
        k_loss: f32,
    },
    /// No wall surface sensor configured or available
    NoWallSensor,
    /// Solar gain on the facade would bias the reading
    SunUp,
    /// Indoor/outdoor difference too small to be meaningful
    DeltaTooSmall {
        /// Observed difference (°C)
        delta: f32,
    },
    /// The wall is warmer than the room air, so the sensor is misplaced or sunlit
    WallWarmerThanAir,
}

/// Estimate `k_loss` from a wall surface reading
pub fn estimate(t_air: f32, t_out: f32, t_wall: Option<f32>, sun_elevation: f32) -> Calibration {
    let t_wall = match t_wall {
        Some(t) if t.is_finite() => t,
        _ => return Calibration::NoWallSensor,
    };
    if sun_elevation > 0.0 {
        return Calibration::SunUp;
    }
    let delta = t_air - t_out;
    if delta < CALIBRATION_MIN_DELTA_C {
        return Calibration::DeltaTooSmall { delta };
    }
    if t_wall > t_air {
        return Calibration::WallWarmerThanAir;
    }
    let k_loss = ((t_air - t_wall) / (delta * K_LOSS_TO_SURFACE_FRACTION)).clamp(0.0, 1.0);
    Calibration::Estimated { k_loss }
}
