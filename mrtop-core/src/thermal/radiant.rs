//! Radiant heating surfaces
//!
//! A warm floor or radiator raises the mean radiant temperature directly, but
//! only as fast as its thermal mass allows. The boost is modelled as a first
//! order lag toward `(T_target − T_air) · view_factor`:
//!
//! ```text
//! a     = 1 − exp(−Δt / τ)
//! boost = boost_prev + a · (target − boost_prev)
//! ```
//!
//! | System    | τ (s) | View factor |
//! |-----------|-------|-------------|
//! | Slab      | 1200  | 0.4         |
//! | Staple-up | 370   | 0.3         |
//! | Radiator  | 120   | 0.1         |

use libm::expf;
use serde::{Deserialize, Serialize};

use crate::constants::comfort::{
    RADIANT_TAU_RADIATOR_S, RADIANT_TAU_SLAB_S, RADIANT_TAU_STAPLE_UP_S, RADIANT_VIEW_RADIATOR,
    RADIANT_VIEW_SLAB, RADIANT_VIEW_STAPLE_UP,
};

/// Construction of a radiant heating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiantSystem {
    /// Pipes cast in a concrete slab (high mass)
    #[default]
    Slab,
    /// Pipes stapled under a wooden subfloor (medium mass)
    StapleUp,
    /// Panel radiator (low mass)
    Radiator,
}

impl RadiantSystem {
    /// Time constant (s)
    pub const fn time_constant_s(&self) -> f32 {
        match self {
            Self::Slab => RADIANT_TAU_SLAB_S,
            Self::StapleUp => RADIANT_TAU_STAPLE_UP_S,
            Self::Radiator => RADIANT_TAU_RADIATOR_S,
        }
    }

    /// Occupant-to-surface view factor
    pub const fn view_factor(&self) -> f32 {
        match self {
            Self::Slab => RADIANT_VIEW_SLAB,
            Self::StapleUp => RADIANT_VIEW_STAPLE_UP,
            Self::Radiator => RADIANT_VIEW_RADIATOR,
        }
    }

    /// Steady-state boost for a target surface temperature
    pub fn target_boost(&self, target_c: f32, t_air: f32) -> f32 {
        ((target_c - t_air) * self.view_factor()).max(0.0)
    }

    /// Advance the lagged boost by `dt_s` seconds toward `target`
    pub fn advance(&self, previous: f32, target: f32, dt_s: f32) -> f32 {
        if dt_s <= 0.0 {
            return previous;
        }
        let a = 1.0 - expf(-dt_s / self.time_constant_s());
        previous + a * (target - previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radiator_responds_faster_than_slab() {
        let slab = RadiantSystem::Slab.advance(0.0, 2.0, 120.0);
        let radiator = RadiantSystem::Radiator.advance(0.0, 2.0, 120.0);
        assert!(radiator > slab);
        // one time constant reaches 1 − 1/e
        assert!((radiator - 2.0 * (1.0 - (-1.0f32).exp())).abs() < 1e-4);
    }

    #[test]
    fn boost_never_cools() {
        assert_eq!(RadiantSystem::Slab.target_boost(20.0, 22.0), 0.0);
        assert!((RadiantSystem::Slab.target_boost(28.0, 22.0) - 2.4).abs() < 1e-5);
    }

    #[test]
    fn zero_elapsed_holds_previous() {
        assert_eq!(RadiantSystem::StapleUp.advance(1.5, 3.0, 0.0), 1.5);
    }

    #[test]
    fn decays_when_heating_stops() {
        let mut boost = 2.0;
        for _ in 0..10 {
            boost = RadiantSystem::Radiator.advance(boost, 0.0, 120.0);
        }
        assert!(boost < 0.001);
    }
}
