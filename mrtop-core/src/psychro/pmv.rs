//! Predicted Mean Vote / Predicted Percentage Dissatisfied (ISO 7730)
//!
//! PMV predicts the mean thermal sensation vote of a large group on the
//! seven-point scale from -3 (cold) to +3 (hot). PPD follows from PMV in
//! closed form:
//!
//! ```text
//! PPD = 100 − 95 · exp(−0.03353·PMV⁴ − 0.2179·PMV²)
//! ```
//!
//! The clothing surface temperature has no closed form; it is found by the
//! fixed-point iteration of ISO 7730 Annex D, capped at
//! [`PMV_MAX_ITERATIONS`] steps with tolerance [`PMV_TOLERANCE`]. The solver
//! is a pure function and runs in `f64`.

use libm::{exp, fabs, pow, sqrt};
use serde::Serialize;

use crate::constants::comfort::{PMV_MAX_ITERATIONS, PMV_TOLERANCE};

/// Inputs to the PMV model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PmvInputs {
    /// Air temperature (°C)
    pub t_air: f32,
    /// Mean radiant temperature (°C)
    pub mrt: f32,
    /// Relative air speed (m/s)
    pub air_speed: f32,
    /// Relative humidity (%)
    pub rh: f32,
    /// Metabolic rate (met)
    pub met: f32,
    /// Clothing insulation (clo)
    pub clo: f32,
}

/// Comfort vote and dissatisfaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PmvResult {
    /// Predicted mean vote
    pub pmv: f32,
    /// Predicted percentage dissatisfied (%)
    pub ppd: f32,
}

/// PPD from PMV (%)
pub fn ppd(pmv: f32) -> f32 {
    let p = pmv as f64;
    (100.0 - 95.0 * exp(-0.03353 * pow(p, 4.0) - 0.2179 * p * p)) as f32
}

/// Solve ISO 7730 PMV.
///
/// Returns `None` if the clothing temperature iteration does not converge
/// within the step limit or the inputs are not finite.
pub fn compute(inputs: &PmvInputs) -> Option<PmvResult> {
    let ta = inputs.t_air as f64;
    let tr = inputs.mrt as f64;
    let vel = (inputs.air_speed as f64).max(0.0);
    let rh = inputs.rh as f64;
    if !(ta.is_finite() && tr.is_finite() && vel.is_finite() && rh.is_finite()) {
        return None;
    }

    // water vapour partial pressure (Pa)
    let pa = rh * 10.0 * exp(16.6536 - 4030.183 / (ta + 235.0));
    let icl = 0.155 * inputs.clo as f64;
    let m = inputs.met as f64 * 58.15;
    let mw = m; // no external work

    let fcl = if icl <= 0.078 { 1.0 + 1.29 * icl } else { 1.05 + 0.645 * icl };
    let hcf = 12.1 * sqrt(vel);
    let taa = ta + 273.0;
    let tra = tr + 273.0;

    let tcla = taa + (35.5 - ta) / (3.5 * icl + 0.1);
    let p1 = icl * fcl;
    let p2 = p1 * 3.96;
    let p3 = p1 * 100.0;
    let p4 = p1 * taa;
    let p5 = 308.7 - 0.028 * mw + p2 * pow(tra / 100.0, 4.0);

    let mut xn = tcla / 100.0;
    let mut xf = tcla / 50.0;
    let mut hc = hcf;
    let mut n = 0;
    while fabs(xn - xf) > PMV_TOLERANCE {
        xf = (xf + xn) / 2.0;
        let hcn = 2.38 * pow(fabs(100.0 * xf - taa), 0.25);
        hc = if hcf > hcn { hcf } else { hcn };
        xn = (p5 + p4 * hc - p2 * pow(xf, 4.0)) / (100.0 + p3 * hc);
        n += 1;
        if n > PMV_MAX_ITERATIONS {
            return None;
        }
    }
    let tcl = 100.0 * xn - 273.0;

    // heat losses (W/m²)
    let hl1 = 3.05e-3 * (5733.0 - 6.99 * mw - pa);
    let hl2 = if mw > 58.15 { 0.42 * (mw - 58.15) } else { 0.0 };
    let hl3 = 1.7e-5 * m * (5867.0 - pa);
    let hl4 = 0.0014 * m * (34.0 - ta);
    let hl5 = 3.96 * fcl * (pow(xn, 4.0) - pow(tra / 100.0, 4.0));
    let hl6 = fcl * hc * (tcl - ta);

    let ts = 0.303 * exp(-0.036 * m) + 0.028;
    let pmv = (ts * (mw - hl1 - hl2 - hl3 - hl4 - hl5 - hl6)) as f32;
    if !pmv.is_finite() {
        return None;
    }
    Some(PmvResult { pmv, ppd: ppd(pmv) })
}
