//! Mean Radiant and Operative Temperature Model
//!
//! ## Overview
//!
//! Occupants exchange heat with room air by convection and with the room's
//! surfaces by radiation. A thermostat measures only the air. Near a cold
//! window in winter, or a sunlit wall in summer, the surfaces can be several
//! degrees away from the air and comfort follows the surfaces.
//!
//! Without surface sensors the mean radiant temperature (MRT) is estimated
//! from a steady-state balance of the exterior envelope:
//!
//! ```text
//! loss    = k_loss · (T_air − T_out,eff) · (f_out + 1.5·f_win) · (1 + 0.02·w)
//! solar   = k_solar · (I / 400) · incidence · f_win            (0 at night)
//! MRT_calc = T_air − loss + solar · shading + radiant_boost
//! ```
//!
//! where `w = 0.7·wind + 0.3·gust` and `T_out,eff` is the wind-chilled
//! outdoor temperature from the resolver.
//!
//! ## Stability
//!
//! The estimate is only as good as its inputs, so two guards keep it sane:
//!
//! 1. **Clamp** to `[min(T_air, T_out) − 4, max(T_air, T_out) + 4]`. Real
//!    surfaces cannot be much colder than outdoors or much warmer than the
//!    warmest of air and outdoors.
//! 2. **Exponential smoothing** with factor `alpha` against the persisted
//!    previous value. Surfaces have thermal mass; jumps in the calculation
//!    from a passing cloud should not jump the output.
//!
//! The first calculation for a room initialises the smoothed value directly.
//!
//! ## Outputs
//!
//! Besides MRT the model produces the operative temperature (see
//! [`convection`]) and the heat flux through the exterior wall:
//!
//! ```text
//! U_wall = 10 · k_loss                                   W/(m²·K)
//! q      = U_wall · ΔT                                   no geometry
//! q      = (U_wall·(A_wall − A_win) + U_win·A_win) · ΔT / A_wall
//! ```
//!
//! Positive flux is heat leaving the room.

pub mod calibration;
pub mod convection;
pub mod radiant;

use serde::{Deserialize, Serialize};

use crate::constants::comfort::{DEFAULT_CLO, DEFAULT_MET};
use crate::constants::physics::{
    K_LOSS_TO_U_VALUE, MRT_CLAMP_MARGIN_C, SOLAR_REFERENCE_W_PER_M2, WINDOW_LOSS_WEIGHT,
    WIND_LOSS_COEFF, WIND_SUSTAINED_WEIGHT,
};
use crate::errors::{push_warning, ModelWarning, Warnings};
use crate::profile::RoomProfile;
use crate::resolver::heuristics::incidence_factor;
use crate::time::{delta_secs, Timestamp};

pub use calibration::Calibration;
pub use radiant::RadiantSystem;

/// Smoothed model state persisted per room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Last smoothed MRT; absent until the first successful calculation
    #[serde(default)]
    pub mrt_prev: Option<f32>,
    /// Time of the last successful calculation
    #[serde(default)]
    pub last_update_ts: Option<Timestamp>,
    /// Lagged radiant heating contribution (°C)
    #[serde(default)]
    pub radiant_boost: f32,
    /// Clothing insulation for PMV (clo)
    #[serde(default = "default_clo")]
    pub pmv_clo: f32,
    /// Metabolic rate for PMV (met)
    #[serde(default = "default_met")]
    pub pmv_met: f32,
}

fn default_clo() -> f32 {
    DEFAULT_CLO
}

fn default_met() -> f32 {
    DEFAULT_MET
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            mrt_prev: None,
            last_update_ts: None,
            radiant_boost: 0.0,
            pmv_clo: DEFAULT_CLO,
            pmv_met: DEFAULT_MET,
        }
    }
}

impl ModelState {
    /// Fresh state with given PMV defaults
    pub fn with_pmv(clo: f32, met: f32) -> Self {
        Self {
            pmv_clo: clo,
            pmv_met: met,
            ..Self::default()
        }
    }
}

/// Resolved inputs for one calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalInputs {
    /// Indoor air temperature (°C)
    pub t_air: f32,
    /// Outdoor dry-bulb temperature (°C)
    pub t_out: f32,
    /// Outdoor temperature including wind chill (°C)
    pub t_out_effective: f32,
    /// Sustained wind speed (m/s)
    pub wind_speed: f32,
    /// Gust speed (m/s)
    pub wind_gust: f32,
    /// Global irradiance (W/m²)
    pub irradiance: f32,
    /// Shading factor, 1 = unshaded
    pub shading: f32,
    /// Sun elevation from a live source (degrees); `None` if unknown
    pub sun_elevation: Option<f32>,
    /// Sun azimuth, if known (degrees)
    pub sun_azimuth: Option<f32>,
    /// Indoor air speed (m/s)
    pub air_speed: f32,
    /// Radiant heating is currently delivering heat
    pub radiant_active: bool,
    /// Radiant surface target (°C)
    pub radiant_target: f32,
    /// Calculation time
    pub now: Timestamp,
}

/// Intermediate and final values of one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalOutput {
    /// Envelope loss term (°C)
    pub loss_term: f32,
    /// Solar gain term before shading (°C)
    pub solar_term: f32,
    /// Angle-of-incidence factor
    pub incidence: f32,
    /// Lagged radiant boost (°C)
    pub radiant_boost: f32,
    /// Instantaneous MRT (°C)
    pub mrt_calc: f32,
    /// MRT after clamping (°C)
    pub mrt_clamped: f32,
    /// Smoothed MRT (°C)
    pub mrt_final: f32,
    /// Convective coefficient (W/(m²·K))
    pub h_c: f32,
    /// Radiant weighting factor
    pub a_radiant: f32,
    /// Operative temperature (°C)
    pub top: f32,
    /// Exterior wall heat flux, positive = loss (W/m²)
    pub heat_flux: f32,
    /// Total heat loss through the exterior wall (W)
    pub heat_loss_w: f32,
    /// Non-fatal conditions
    pub warnings: Warnings,
}

/// Result of a calculation plus the state to persist if it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalStep {
    /// Calculated values
    pub output: ThermalOutput,
    /// State for the next cycle; `None` if the calculation degenerated
    pub next_state: Option<ModelState>,
}

/// Steady-state MRT model
#[derive(Debug, Clone, Copy)]
pub struct ThermalModel {
    clamp_margin_c: f32,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self {
            clamp_margin_c: MRT_CLAMP_MARGIN_C,
        }
    }
}

impl ThermalModel {
    /// Model with a custom clamp margin (°C).
    ///
    /// The margin is taken as a magnitude; a non-finite margin keeps the default.
    pub fn with_clamp_margin(clamp_margin_c: f32) -> Self {
        let clamp_margin_c = if clamp_margin_c.is_finite() {
            clamp_margin_c.abs()
        } else {
            MRT_CLAMP_MARGIN_C
        };
        Self { clamp_margin_c }
    }

    /// Envelope loss term (°C)
    pub fn loss_term(profile: &RoomProfile, t_air: f32, t_out_effective: f32, wind: f32, gust: f32) -> f32 {
        let f = &profile.factors;
        let w = WIND_SUSTAINED_WEIGHT * wind.max(0.0) + (1.0 - WIND_SUSTAINED_WEIGHT) * gust.max(wind).max(0.0);
        f.k_loss * (t_air - t_out_effective) * (f.f_out + WINDOW_LOSS_WEIGHT * f.f_win) * (1.0 + WIND_LOSS_COEFF * w)
    }

    /// Solar gain term before shading (°C).
    ///
    /// Zero with the sun at or below the horizon. An unknown elevation leaves
    /// the irradiance in charge.
    pub fn solar_term(profile: &RoomProfile, irradiance: f32, sun_elevation: Option<f32>, incidence: f32) -> f32 {
        if matches!(sun_elevation, Some(e) if e.is_nan() || e <= 0.0) {
            return 0.0;
        }
        let f = &profile.factors;
        f.k_solar * (irradiance.max(0.0) / SOLAR_REFERENCE_W_PER_M2) * incidence * f.f_win
    }

    /// Clamp an instantaneous MRT to the air/outdoor envelope
    pub fn clamp(&self, mrt_calc: f32, t_air: f32, t_out: f32) -> f32 {
        let lower = t_air.min(t_out) - self.clamp_margin_c;
        let upper = t_air.max(t_out) + self.clamp_margin_c;
        // NaN bounds fail the comparison; the NaN reaches the finiteness check
        if lower <= upper {
            mrt_calc.clamp(lower, upper)
        } else {
            mrt_calc
        }
    }

    /// Exponential smoothing step
    pub fn smooth(previous: f32, current: f32, alpha: f32) -> f32 {
        (1.0 - alpha) * previous + alpha * current
    }

    /// Wall heat flux (W/m²) and total wall loss (W)
    pub fn heat_flux(profile: &RoomProfile, t_air: f32, t_out: f32) -> (f32, f32) {
        let delta = t_air - t_out;
        let u_wall = K_LOSS_TO_U_VALUE * profile.factors.k_loss;
        match profile.geometry.filter(|g| g.gross_wall_area > 0.0) {
            Some(g) => {
                let window = g.window_area.clamp(0.0, g.gross_wall_area);
                let conductance = u_wall * (g.gross_wall_area - window) + g.window_u_value * window;
                let q = conductance * delta / g.gross_wall_area;
                (q, q * g.gross_wall_area)
            }
            None => {
                let q = u_wall * delta;
                (q, q * profile.factors.f_out * profile.area_m2)
            }
        }
    }

    /// Run one calculation cycle.
    ///
    /// Pure: the caller persists `next_state` when it is present.
    pub fn compute(&self, profile: &RoomProfile, state: &ModelState, inputs: &ThermalInputs) -> ThermalStep {
        let mut warnings = Warnings::new();
        let t_air = inputs.t_air;

        let loss_term = Self::loss_term(profile, t_air, inputs.t_out_effective, inputs.wind_speed, inputs.wind_gust);
        let incidence = incidence_factor(inputs.sun_azimuth, profile.orientation_deg);
        let solar_term = Self::solar_term(profile, inputs.irradiance, inputs.sun_elevation, incidence);
        let shading = inputs.shading.clamp(0.0, 1.0);

        let dt_s = state.last_update_ts.map(|ts| delta_secs(ts, inputs.now)).unwrap_or(0.0);
        let system = profile.radiant_system_type;
        let boost_target = if profile.is_radiant_heating && inputs.radiant_active {
            system.target_boost(inputs.radiant_target, t_air)
        } else {
            0.0
        };
        let radiant_boost = if profile.is_radiant_heating {
            system.advance(state.radiant_boost, boost_target, dt_s)
        } else {
            0.0
        };

        let mrt_calc = t_air - loss_term + solar_term * shading + radiant_boost;
        let mrt_clamped = self.clamp(mrt_calc, t_air, inputs.t_out);
        let mrt_final = match state.mrt_prev {
            Some(prev) if prev.is_finite() => Self::smooth(prev, mrt_clamped, profile.alpha),
            _ => mrt_clamped,
        };

        let (h_c, a_radiant, degenerate) = convection::radiant_weight_for_speed(inputs.air_speed);
        if degenerate {
            log_warn!("degenerate convection at air speed {}, using A=0.5", inputs.air_speed);
            push_warning(&mut warnings, ModelWarning::DegenerateConvection);
        }

        let (heat_flux, heat_loss_w) = Self::heat_flux(profile, t_air, inputs.t_out);

        if !mrt_final.is_finite() {
            log_warn!("non-finite MRT (calc {}), keeping previous state", mrt_calc);
            push_warning(&mut warnings, ModelWarning::NonFiniteResult { stage: "mrt" });
            let fallback = state.mrt_prev.filter(|v| v.is_finite()).unwrap_or(t_air);
            return ThermalStep {
                output: ThermalOutput {
                    loss_term,
                    solar_term,
                    incidence,
                    radiant_boost: state.radiant_boost,
                    mrt_calc,
                    mrt_clamped,
                    mrt_final: fallback,
                    h_c,
                    a_radiant,
                    top: convection::operative_temperature(a_radiant, fallback, t_air),
                    heat_flux,
                    heat_loss_w,
                    warnings,
                },
                next_state: None,
            };
        }

        let top = convection::operative_temperature(a_radiant, mrt_final, t_air);
        let next_state = ModelState {
            mrt_prev: Some(mrt_final),
            last_update_ts: Some(inputs.now),
            radiant_boost,
            ..*state
        };

        ThermalStep {
            output: ThermalOutput {
                loss_term,
                solar_term,
                incidence,
                radiant_boost,
                mrt_calc,
                mrt_clamped,
                mrt_final,
                h_c,
                a_radiant,
                top,
                heat_flux,
                heat_loss_w,
                warnings,
            },
            next_state: Some(next_state),
        }
    }
}
