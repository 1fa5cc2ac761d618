//! Built-in room profiles
//!
//! Factor sets for common room situations, from a basement with a small
//! window up to an attic under the roof. Rooms start on one of these and move
//! to a custom profile once the factors are tuned.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::CoreFactors;

/// A built-in profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// One exterior wall with a large window
    OneWallLargeWindow,
    /// Corner room with large windows
    TwoWallLargeWindow,
    /// Room directly under the roof
    Attic,
    /// Top floor, small vertical window
    TopfloorVertSmallWindow,
    /// Top floor, medium vertical window
    TopfloorVertMediumWindow,
    /// Top floor corner with cavity walls
    TopfloorTwoWallsCavity,
    /// Top floor next to an unheated space
    TopfloorColdAdjacent,
    /// Corner room with small windows
    TwoWallSmallWindow,
    /// One exterior wall with a small window
    OneWallSmallWindow,
    /// Below grade
    Basement,
    /// One exterior wall plus an unheated neighbour
    OneWallColdAdjacent,
    /// Corner room plus an unheated neighbour
    CornerColdAdjacent,
    /// No exterior surfaces
    Interior,
    /// Interior room next to an unheated space
    InteriorColdAdjacent,
}

impl Preset {
    /// All built-in profiles
    pub const ALL: [Preset; 14] = [
        Self::OneWallLargeWindow,
        Self::TwoWallLargeWindow,
        Self::Attic,
        Self::TopfloorVertSmallWindow,
        Self::TopfloorVertMediumWindow,
        Self::TopfloorTwoWallsCavity,
        Self::TopfloorColdAdjacent,
        Self::TwoWallSmallWindow,
        Self::OneWallSmallWindow,
        Self::Basement,
        Self::OneWallColdAdjacent,
        Self::CornerColdAdjacent,
        Self::Interior,
        Self::InteriorColdAdjacent,
    ];

    /// Factor set
    pub const fn factors(&self) -> CoreFactors {
        let (f_out, f_win, k_loss, k_solar) = match self {
            Self::OneWallLargeWindow => (0.5, 0.40, 0.14, 1.20),
            Self::TwoWallLargeWindow => (0.8, 0.50, 0.16, 1.40),
            Self::Attic => (0.9, 0.40, 0.20, 1.50),
            Self::TopfloorVertSmallWindow => (0.9, 0.15, 0.23, 0.75),
            Self::TopfloorVertMediumWindow => (0.9, 0.30, 0.22, 1.00),
            Self::TopfloorTwoWallsCavity => (0.95, 0.25, 0.24, 0.95),
            Self::TopfloorColdAdjacent => (0.95, 0.35, 0.23, 1.15),
            Self::TwoWallSmallWindow => (0.7, 0.30, 0.16, 1.00),
            Self::OneWallSmallWindow => (0.5, 0.20, 0.12, 0.80),
            Self::Basement => (0.4, 0.20, 0.10, 0.60),
            Self::OneWallColdAdjacent => (0.6, 0.30, 0.18, 0.80),
            Self::CornerColdAdjacent => (0.8, 0.40, 0.20, 1.00),
            Self::Interior => (0.0, 0.00, 0.08, 0.40),
            Self::InteriorColdAdjacent => (0.3, 0.00, 0.12, 0.40),
        };
        CoreFactors { f_out, f_win, k_loss, k_solar }
    }

    /// Stable key, also the serialized form
    pub const fn key(&self) -> &'static str {
        match self {
            Self::OneWallLargeWindow => "one_wall_large_window",
            Self::TwoWallLargeWindow => "two_wall_large_window",
            Self::Attic => "attic",
            Self::TopfloorVertSmallWindow => "topfloor_vert_small_window",
            Self::TopfloorVertMediumWindow => "topfloor_vert_medium_window",
            Self::TopfloorTwoWallsCavity => "topfloor_two_walls_cavity",
            Self::TopfloorColdAdjacent => "topfloor_cold_adjacent",
            Self::TwoWallSmallWindow => "two_wall_small_window",
            Self::OneWallSmallWindow => "one_wall_small_window",
            Self::Basement => "basement",
            Self::OneWallColdAdjacent => "one_wall_cold_adjacent",
            Self::CornerColdAdjacent => "corner_cold_adjacent",
            Self::Interior => "interior",
            Self::InteriorColdAdjacent => "interior_cold_adjacent",
        }
    }

    /// Look up by key, ignoring ASCII case
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.iter().copied().find(|p| p.key().eq_ignore_ascii_case(key))
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::OneWallLargeWindow
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_valid_and_keyed() {
        for preset in Preset::ALL {
            assert!(preset.factors().validate().is_ok(), "{}", preset);
            assert_eq!(Preset::from_key(preset.key()), Some(preset));
        }
        assert_eq!(Preset::from_key("ATTIC"), Some(Preset::Attic));
        assert_eq!(Preset::from_key("garage"), None);
    }

    #[test]
    fn serialized_form_matches_key() {
        let json = serde_json::to_string(&Preset::TopfloorTwoWallsCavity).unwrap();
        assert_eq!(json, "\"topfloor_two_walls_cavity\"");
    }

    #[test]
    fn interior_has_no_envelope() {
        let f = Preset::Interior.factors();
        assert_eq!(f.f_out, 0.0);
        assert_eq!(f.f_win, 0.0);
    }
}
