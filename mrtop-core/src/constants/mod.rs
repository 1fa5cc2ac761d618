//! Constants for the Comfort Engine
//!
//! Every coefficient used by the models lives here with its unit and source.
//!
//! ## Organization
//!
//! - **Physics**: psychrometric, heat-transfer and atmospheric constants
//! - **Comfort**: classification bands, PMV parameters, air speeds, radiant systems
//! - **Resolver**: constant fallbacks at the end of each resolution chain
//! - **Time**: conversions and default intervals
//! - **Buffers**: capacity limits

/// Physical constants from psychrometrics, heat transfer and the standard atmosphere.
pub mod physics;

/// Comfort thresholds and model defaults.
pub mod comfort;

/// Last-resort constants used by the data resolver.
pub mod resolver;

/// Time-related constants for intervals and validity windows.
pub mod time;

/// Capacity limits for per-room collections.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use physics::{KELVIN_OFFSET, SEA_LEVEL_PRESSURE_HPA, H_RADIATIVE_W_PER_M2K};

pub use comfort::{DEFAULT_ALPHA, DEFAULT_CLO, DEFAULT_MET};

pub use time::{DEFAULT_MIN_UPDATE_INTERVAL_MS, DEFAULT_SOURCE_TTL_MS};

pub use buffers::MAX_CUSTOM_PROFILES;
