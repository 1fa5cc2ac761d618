//! Error and Warning Types for the Comfort Engine
//!
//! ## Design Philosophy
//!
//! The engine distinguishes three kinds of trouble:
//!
//! 1. **Missing or stale inputs** are not errors at all. The resolver walks to
//!    the next fallback tier and the result carries the provenance, so nothing
//!    here models them.
//!
//! 2. **Invalid configuration** is rejected up front with a [`ComfortError`].
//!    Every operation that can fail this way leaves the prior state untouched.
//!
//! 3. **Degenerate computations** (a zero denominator, a solver that does not
//!    converge) fall back to a documented safe value and record a
//!    [`ModelWarning`] in the result instead of failing the cycle.
//!
//! Errors are `Copy` and carry only `&'static str` context so they can be
//! returned from the hot path without allocation.
//!
//! ## Example
//!
//! ```rust
//! use mrtop_core::profile::ProfileManager;
//! use mrtop_core::ComfortError;
//!
//! let mut profiles = ProfileManager::default();
//! match profiles.save("") {
//!     Err(ComfortError::EmptyProfileName) => {}
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::constants::buffers::MAX_WARNINGS;

/// Result type for engine operations
pub type ComfortResult<T> = Result<T, ComfortError>;

/// Identifier of a room within a home
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

/// Identifier of an aggregator node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatorId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

impl fmt::Display for AggregatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aggregator#{}", self.0)
    }
}

/// Configuration and state-machine errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ComfortError {
    /// A configuration field is unusable
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// A numeric parameter lies outside its accepted range
    #[error("{name} = {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f32,
        /// Inclusive lower bound
        min: f32,
        /// Inclusive upper bound
        max: f32,
    },

    /// The room already holds the maximum number of custom profiles
    #[error("Custom profile limit of {cap} reached")]
    ProfileCapExceeded {
        /// The per-room limit
        cap: usize,
    },

    /// Attaching the child would make an aggregator its own descendant
    #[error("Attaching {child} under {parent} would create a cycle")]
    AggregatorCycle {
        /// Node receiving the child
        parent: AggregatorId,
        /// Node being attached
        child: AggregatorId,
    },

    /// An aggregator can sit under one parent only
    #[error("{child} is already attached under {parent}")]
    AggregatorHasParent {
        /// Node that already holds the child
        parent: AggregatorId,
        /// Node being attached a second time
        child: AggregatorId,
    },

    /// A room would be counted twice in one aggregator's subtree
    #[error("{room} appears more than once under {aggregator}")]
    RoomRepeated {
        /// Root of the subtree
        aggregator: AggregatorId,
        /// Repeated room
        room: RoomId,
    },

    /// No aggregator with this id exists
    #[error("Unknown {0}")]
    UnknownAggregator(AggregatorId),

    /// No room with this id exists
    #[error("Unknown {0}")]
    UnknownRoom(RoomId),

    /// A room with this id is already registered
    #[error("Duplicate {0}")]
    DuplicateRoom(RoomId),

    /// No custom profile with the given id
    #[error("Unknown custom profile {0}")]
    UnknownProfile(u32),

    /// Profile names may not be empty
    #[error("Profile name is empty")]
    EmptyProfileName,

    /// The name belongs to a built-in profile or the scratch slot
    #[error("Profile name is reserved")]
    ReservedProfileName,

    /// Saving requires the scratch slot to be selected
    #[error("No unsaved profile to save")]
    NothingToSave,
}

/// Non-fatal conditions recorded during a calculation cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelWarning {
    /// `h_c + h_r` was zero or not finite; radiant weighting fell back to 0.5
    DegenerateConvection,

    /// An irradiance sensor reported more than the clear-sky ceiling
    IrradianceAboveLimit {
        /// Reported irradiance (W/m²)
        value: f32,
    },

    /// `k_loss` is accepted but lies outside its nominal band
    KLossOutsideNominal {
        /// Configured loss factor
        value: f32,
    },

    /// The PMV iteration hit its step limit before converging
    PmvNotConverged,

    /// A model stage produced NaN or infinity; the named value was substituted
    NonFiniteResult {
        /// Stage that misbehaved
        stage: &'static str,
    },
}

/// Warnings recorded during one calculation
pub type Warnings = heapless::Vec<ModelWarning, MAX_WARNINGS>;

/// Record a warning once; extras beyond capacity are dropped
pub fn push_warning(warnings: &mut Warnings, warning: ModelWarning) {
    if !warnings.contains(&warning) {
        let _ = warnings.push(warning);
    }
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateConvection => write!(f, "degenerate convection, using A=0.5"),
            Self::IrradianceAboveLimit { value } => {
                write!(f, "irradiance {} W/m² above physical limit", value)
            }
            Self::KLossOutsideNominal { value } => {
                write!(f, "k_loss {} outside nominal range", value)
            }
            Self::PmvNotConverged => write!(f, "PMV iteration did not converge"),
            Self::NonFiniteResult { stage } => write!(f, "non-finite value in {}", stage),
        }
    }
}
