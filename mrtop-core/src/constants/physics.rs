//! Physical Constants for the Comfort Engine
//!
//! Psychrometric coefficients, heat-transfer coefficients and atmospheric
//! constants. All values follow published standards; the source of each is
//! noted so the coefficients can be audited.

// ===== FUNDAMENTAL PHYSICS CONSTANTS =====

/// Offset between Celsius and Kelvin.
///
/// Source: NIST Special Publication 330 (2019)
pub const KELVIN_OFFSET: f32 = 273.15;

/// Standard atmospheric pressure at sea level (hPa/mbar).
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

/// Barometric height coefficient (1/m) for the ISA troposphere.
///
/// `P(h) = P0 · (1 − c·h)^5.25588`
///
/// Source: ICAO Standard Atmosphere, Doc 7488
pub const BAROMETRIC_HEIGHT_COEFF_PER_M: f32 = 2.25577e-5;

/// Barometric exponent for the ISA troposphere.
///
/// Source: ICAO Standard Atmosphere, Doc 7488
pub const BAROMETRIC_EXPONENT: f32 = 5.25588;

// ===== SATURATION VAPOUR PRESSURE (MAGNUS) =====

/// Magnus base pressure (hPa).
///
/// Source: Bolton (1980), Monthly Weather Review 108
pub const MAGNUS_BASE_HPA: f32 = 6.112;

/// Magnus coefficient over water for saturation pressure.
///
/// Source: Bolton (1980)
pub const MAGNUS_A_WATER: f32 = 17.67;

/// Magnus temperature offset over water (°C).
///
/// Source: Bolton (1980)
pub const MAGNUS_B_WATER_C: f32 = 243.5;

/// Magnus coefficient used for dew point inversion.
///
/// Source: Alduchov & Eskridge (1996) / Lawrence (2005)
pub const DEW_POINT_A: f32 = 17.27;

/// Magnus offset used for dew point inversion (°C).
///
/// Source: Alduchov & Eskridge (1996) / Lawrence (2005)
pub const DEW_POINT_B_C: f32 = 237.7;

/// Magnus coefficient over ice.
///
/// Source: Sonntag (1990), WMO-No. 8 Annex 4.B
pub const MAGNUS_A_ICE: f32 = 22.46;

/// Magnus temperature offset over ice (°C).
///
/// Source: Sonntag (1990), WMO-No. 8 Annex 4.B
pub const MAGNUS_B_ICE_C: f32 = 272.62;

/// Dew point reported for completely dry air (°C).
pub const DRY_AIR_DEW_POINT_C: f32 = -50.0;

/// Water vapour density factor: `ρ_v [g/m³] = 216.74 · e[hPa] / T[K]`.
///
/// Source: ideal gas law with R_v = 461.5 J/(kg·K)
pub const VAPOUR_DENSITY_FACTOR: f32 = 216.74;

/// Ratio of molar masses of water and dry air.
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 1
pub const MOLAR_MASS_RATIO: f32 = 0.621945;

/// Specific heat of dry air (kJ/(kg·K)).
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 1, Eq. 32
pub const CP_DRY_AIR_KJ_PER_KG_K: f32 = 1.006;

/// Specific heat of water vapour (kJ/(kg·K)).
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 1, Eq. 32
pub const CP_VAPOUR_KJ_PER_KG_K: f32 = 1.86;

/// Latent heat of vaporisation at 0 °C (kJ/kg).
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 1, Eq. 32
pub const LATENT_HEAT_KJ_PER_KG: f32 = 2501.0;

// ===== HUMIDEX =====

/// Humidex vapour pressure constant (K).
///
/// Source: Environment Canada, Masterton & Richardson (1979)
pub const HUMIDEX_VAPOUR_CONSTANT_K: f32 = 5417.753;

/// Humidex reference temperature (K).
///
/// Source: Masterton & Richardson (1979)
pub const HUMIDEX_REFERENCE_K: f32 = 273.16;

/// Humidex vapour pressure scale (hPa).
///
/// Source: Masterton & Richardson (1979)
pub const HUMIDEX_BASE_HPA: f32 = 6.11;

// ===== HEAT TRANSFER =====

/// Linearised radiative heat transfer coefficient (W/(m²·K)).
///
/// Typical value for indoor surfaces near 20 °C with emissivity ≈ 0.95.
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 9
pub const H_RADIATIVE_W_PER_M2K: f32 = 4.7;

/// Natural convection coefficient for still air (W/(m²·K)).
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 9, seated occupant
pub const H_CONVECTIVE_STILL_W_PER_M2K: f32 = 3.1;

/// Forced convection multiplier: `h_c = 3.1 + 5.6·v^0.6`.
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 9, Table 6
pub const H_CONVECTIVE_FORCED_COEFF: f32 = 5.6;

/// Forced convection velocity exponent.
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 9, Table 6
pub const H_CONVECTIVE_FORCED_EXPONENT: f32 = 0.6;

/// Air speed at or below which convection is treated as natural (m/s).
pub const STILL_AIR_THRESHOLD_M_PER_S: f32 = 0.1;

/// Radiant weighting used when the convection model degenerates.
pub const FALLBACK_RADIANT_WEIGHT: f32 = 0.5;

/// Scale from the dimensionless `k_loss` to a wall U-value (W/(m²·K)).
///
/// `k_loss = 0.1` maps to U ≈ 1.0, a typical uninsulated cavity wall.
pub const K_LOSS_TO_U_VALUE: f32 = 10.0;

/// Scale from `k_loss` to the fraction of ΔT dropped across the wall interior.
///
/// Same factor is used in reverse by insulation calibration.
pub const K_LOSS_TO_SURFACE_FRACTION: f32 = 2.5;

// ===== STACK EFFECT =====

/// Stack effect coefficient (K/m) with pressure in Pa and P_atm in Pa.
///
/// `ΔP = 0.0342 · P_atm · h · (1/T_out − 1/T_in)`
///
/// Source: ASHRAE Handbook Fundamentals (2017), Ch. 16, Eq. 19
pub const STACK_EFFECT_COEFF: f32 = 0.0342;

/// Default storey height used to convert floor levels to metres.
pub const DEFAULT_FLOOR_HEIGHT_M: f32 = 3.0;

// ===== SOLAR =====

/// Clear-sky ceiling for the irradiance heuristic (W/m²).
pub const SOLAR_HEURISTIC_CAP_W_PER_M2: f32 = 1000.0;

/// Readings above this are implausible at ground level (W/m²).
///
/// Source: solar constant 1361 W/m² less minimal atmospheric loss
pub const SOLAR_SENSOR_WARN_W_PER_M2: f32 = 1300.0;

/// Irradiance at which the solar term reaches `k_solar·f_win` (W/m²).
pub const SOLAR_REFERENCE_W_PER_M2: f32 = 400.0;

/// Irradiance contributed per UV index step (W/m²).
pub const SOLAR_PER_UV_INDEX_W_PER_M2: f32 = 90.0;

/// Irradiance assumed at full daylight without a UV reading (W/m²).
pub const SOLAR_DAYLIGHT_BASE_W_PER_M2: f32 = 100.0;

/// Fraction of irradiance removed by full overcast.
pub const CLOUD_ATTENUATION: f32 = 0.9;

/// Irradiance multiplier during rain, snow or hail.
pub const RAIN_MULTIPLIER: f32 = 0.4;

/// Sun elevation at which the daylight factor saturates (degrees).
pub const DAYLIGHT_FULL_ELEVATION_DEG: f32 = 60.0;

/// Incidence factor for diffuse light when the sun is behind the window.
pub const DIFFUSE_INCIDENCE: f32 = 0.1;

// ===== OUTDOOR COMFORT =====

/// Steadman apparent temperature vapour coefficient (°C/hPa).
///
/// Source: Steadman (1994), Australian Bureau of Meteorology formulation
pub const STEADMAN_VAPOUR_COEFF: f32 = 0.33;

/// Steadman apparent temperature wind coefficient (°C/(m/s)).
///
/// Source: Steadman (1994)
pub const STEADMAN_WIND_COEFF: f32 = 0.70;

/// Steadman apparent temperature offset (°C).
///
/// Source: Steadman (1994)
pub const STEADMAN_OFFSET_C: f32 = 4.0;

/// Loss term increase per m/s of effective wind.
pub const WIND_LOSS_COEFF: f32 = 0.02;

/// Weight of sustained wind in the effective wind speed.
pub const WIND_SUSTAINED_WEIGHT: f32 = 0.7;

/// Window share multiplier in the loss term (glazing loses more than walls).
pub const WINDOW_LOSS_WEIGHT: f32 = 1.5;

/// Margin around the air/outdoor envelope for clamping MRT (°C).
pub const MRT_CLAMP_MARGIN_C: f32 = 4.0;
