//! Capacity Limits
//!
//! Fixed capacities for per-room collections.

/// Maximum number of saved custom profiles per room.
pub const MAX_CUSTOM_PROFILES: usize = 100;

/// Maximum length of a profile name (bytes).
pub const MAX_PROFILE_NAME_LEN: usize = 64;

/// Maximum number of warnings recorded per calculation.
pub const MAX_WARNINGS: usize = 8;
