//! Time-Related Constants
//!
//! Conversion factors and default intervals for scheduling recomputation.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE as u64;

// ===== UPDATE INTERVALS =====

/// Default minimum interval between emitted results (milliseconds).
///
/// Comfort quantities change on the scale of minutes. Thirty seconds keeps
/// results responsive to window and HVAC changes without recomputing on every
/// sensor tick.
pub const DEFAULT_MIN_UPDATE_INTERVAL_MS: u64 = 30 * MS_PER_SECOND;

/// Shortest configurable update interval (milliseconds).
pub const MIN_UPDATE_INTERVAL_FLOOR_MS: u64 = MS_PER_SECOND;

/// Default validity window of a cached source reading (milliseconds).
///
/// Weather integrations typically refresh every 10-30 minutes; one hour
/// tolerates a missed refresh before the reading counts as stale.
pub const DEFAULT_SOURCE_TTL_MS: u64 = 60 * MS_PER_MINUTE;
