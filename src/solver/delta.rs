//! Newton-Raphson pH steps for the alkalinity solvers.
//!
//! Each function returns (TA − TA(pH)) / (dTA/dpH) at the current estimate,
//! where TA(pH) is the alkalinity implied by the estimate and the partner
//! variable. The derivative covers every alkalinity term, not just the
//! carbonate and borate ones.

use core::f64::consts::LN_10;

use crate::chemistry::alkalinity::{
    AlkalinityModel, noncarbonate_alkalinity_slope, ta_from_ph_carb, ta_from_ph_fco2,
    ta_from_ph_hco3, ta_from_tc_ph,
};
use crate::chemistry::h_from_ph;
use crate::chemistry::relations::carbonate_alkalinity_slope_tc;
use crate::models::{SampleConstants, SampleTotals};

/// Converts a residual and dTA/dH into a pH step, using dpH = −dH / (ln10·H).
fn step(residual: f64, slope_h: f64, h: f64) -> f64 {
    residual / (-LN_10 * h * slope_h)
}

/// pH step for the TA/DIC pair.
pub fn ph_from_ta_tc(
    ph: f64,
    ta: f64,
    tc: f64,
    model: AlkalinityModel,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    let h = h_from_ph(ph);
    let factor = model.free_factor(t, k);
    let residual = ta - ta_from_tc_ph(model, tc, ph, t, k);
    let slope =
        carbonate_alkalinity_slope_tc(tc, h, k) + noncarbonate_alkalinity_slope(h, factor, t, k);
    step(residual, slope, h)
}

/// pH step for the TA/fCO2 pair.
pub fn ph_from_ta_fco2(
    ph: f64,
    ta: f64,
    fco2: f64,
    model: AlkalinityModel,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    let h = h_from_ph(ph);
    let factor = model.free_factor(t, k);
    let residual = ta - ta_from_ph_fco2(model, ph, fco2, t, k);
    // HCO3 + 2·CO3 = K0·fCO2·K1·(1/H + 2·K2/H²)
    let carbonate = -k.k0 * fco2 * k.k1 * (1.0 / (h * h) + 4.0 * k.k2 / (h * h * h));
    step(residual, carbonate + noncarbonate_alkalinity_slope(h, factor, t, k), h)
}

/// pH step for the TA/carbonate ion pair.
pub fn ph_from_ta_carb(
    ph: f64,
    ta: f64,
    carb: f64,
    model: AlkalinityModel,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    let h = h_from_ph(ph);
    let factor = model.free_factor(t, k);
    let residual = ta - ta_from_ph_carb(model, ph, carb, t, k);
    // HCO3 + 2·CO3 = CO3·H/K2 + 2·CO3
    let carbonate = carb / k.k2;
    step(residual, carbonate + noncarbonate_alkalinity_slope(h, factor, t, k), h)
}

/// pH step for the TA/bicarbonate ion pair.
pub fn ph_from_ta_hco3(
    ph: f64,
    ta: f64,
    hco3: f64,
    model: AlkalinityModel,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    let h = h_from_ph(ph);
    let factor = model.free_factor(t, k);
    let residual = ta - ta_from_ph_hco3(model, ph, hco3, t, k);
    // HCO3 + 2·CO3 = HCO3 + 2·K2·HCO3/H
    let carbonate = -2.0 * k.k2 * hco3 / (h * h);
    step(residual, carbonate + noncarbonate_alkalinity_slope(h, factor, t, k), h)
}
