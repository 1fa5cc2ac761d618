//! Comfort Thresholds and Model Defaults
//!
//! Classification bands, PMV solver parameters, air-speed rules and radiant
//! system characteristics.

// ===== HUMIDEX BANDS =====

/// Upper bound of "comfortable" humidex.
///
/// Source: Environment Canada humidex guidance
pub const HUMIDEX_COMFORTABLE_MAX: f32 = 30.0;

/// Upper bound of "noticeable discomfort".
pub const HUMIDEX_NOTICEABLE_MAX: f32 = 35.0;

/// Upper bound of "evident discomfort".
pub const HUMIDEX_EVIDENT_MAX: f32 = 40.0;

/// Upper bound of "intense discomfort".
pub const HUMIDEX_INTENSE_MAX: f32 = 46.0;

/// Upper bound of "dangerous discomfort"; above this heat stroke is imminent.
pub const HUMIDEX_DANGEROUS_MAX: f32 = 54.0;

// ===== MOLD RISK =====

/// Surface RH at or above which mold growth becomes possible (%).
///
/// Source: IEA Annex 14, ISO 13788 (80% criterion with 65% early warning)
pub const MOLD_WARNING_RH_PCT: f32 = 65.0;

/// Surface RH above which mold growth is likely (%).
///
/// Source: ISO 13788
pub const MOLD_CRITICAL_RH_PCT: f32 = 80.0;

// ===== PMV / PPD (ISO 7730) =====

/// Default clothing insulation (clo), typical indoor winter wear.
pub const DEFAULT_CLO: f32 = 1.0;

/// Default metabolic rate (met), seated quiet activity.
pub const DEFAULT_MET: f32 = 1.2;

/// Iteration cap for the clothing surface temperature solver.
///
/// Source: ISO 7730:2005 Annex D
pub const PMV_MAX_ITERATIONS: u32 = 150;

/// Convergence tolerance of the clothing surface temperature solver.
///
/// Source: ISO 7730:2005 Annex D
pub const PMV_TOLERANCE: f64 = 0.00015;

/// Accepted clothing insulation range (clo).
///
/// Source: ISO 7730:2005 §4
pub const CLO_RANGE: (f32, f32) = (0.0, 2.0);

/// Accepted metabolic rate range (met).
///
/// Source: ISO 7730:2005 §4
pub const MET_RANGE: (f32, f32) = (0.8, 4.0);

// ===== AIR SPEED (m/s) =====

/// Still indoor air.
pub const AIR_SPEED_STILL: f32 = 0.1;

/// Default air speed while forced-air HVAC is running.
pub const AIR_SPEED_HVAC: f32 = 0.4;

/// Air speed near an open window.
pub const AIR_SPEED_WINDOW_OPEN: f32 = 0.5;

/// Air speed near an open door (through-draft).
pub const AIR_SPEED_DOOR_OPEN: f32 = 0.8;

/// Fan speed "low" / "1".
pub const FAN_SPEED_LOW: f32 = 0.3;

/// Fan speed "medium" / "2".
pub const FAN_SPEED_MEDIUM: f32 = 0.5;

/// Fan speed "high" / "3".
pub const FAN_SPEED_HIGH: f32 = 0.8;

// ===== RADIANT SYSTEMS =====

/// Time constant of a concrete slab system (s).
pub const RADIANT_TAU_SLAB_S: f32 = 1200.0;

/// Time constant of a staple-up (joist) system (s).
pub const RADIANT_TAU_STAPLE_UP_S: f32 = 370.0;

/// Time constant of a panel radiator (s).
pub const RADIANT_TAU_RADIATOR_S: f32 = 120.0;

/// View factor between occupant and a slab floor.
pub const RADIANT_VIEW_SLAB: f32 = 0.4;

/// View factor between occupant and a staple-up floor.
pub const RADIANT_VIEW_STAPLE_UP: f32 = 0.3;

/// View factor between occupant and a panel radiator.
pub const RADIANT_VIEW_RADIATOR: f32 = 0.1;

// ===== PROFILE RANGES =====

/// Nominal `k_loss` band; values outside are accepted with a warning.
pub const K_LOSS_NOMINAL: (f32, f32) = (0.05, 0.3);

/// Hard upper bound on `k_loss`.
pub const K_LOSS_MAX: f32 = 1.0;

/// Accepted `k_solar` range.
pub const K_SOLAR_RANGE: (f32, f32) = (0.0, 2.0);

/// Default smoothing factor.
pub const DEFAULT_ALPHA: f32 = 0.3;

// ===== INSULATION CALIBRATION =====

/// Minimum indoor/outdoor difference for a meaningful calibration (°C).
pub const CALIBRATION_MIN_DELTA_C: f32 = 10.0;
