//! Total alkalinity and its contributions.
//!
//! TA = HCO3 + 2·CO3 + B(OH)4 + OH + PAlk + SiAlk + NH3Alk + H2SAlk
//!      − [H+]free − HSO4 − HF
//!
//! Two variants of the free hydrogen ion term are kept. [`AlkalinityModel::Legacy`]
//! converts [H+] to the Free scale with `1 / (1 + TSO4/KSO4)`, which is only
//! right when the constants are on the Total scale. [`AlkalinityModel::ScaleCorrected`]
//! uses the per-sample `ph_factor_to_free` and is valid on any scale.

use serde::{Deserialize, Serialize};

use super::h_from_ph;
use super::relations::{
    carb_from_tc_h, hco3_from_tc_h, tc_from_ph_carb, tc_from_ph_fco2, tc_from_ph_hco3,
};
use crate::models::{SampleConstants, SampleTotals};

/// Which free hydrogen ion conversion the alkalinity equation uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlkalinityModel {
    #[default]
    Legacy,
    ScaleCorrected,
}

impl AlkalinityModel {
    /// Multiplier from [H+] on the working scale to [H+] on the Free scale.
    pub fn free_factor(self, t: &SampleTotals, k: &SampleConstants) -> f64 {
        match self {
            AlkalinityModel::Legacy => 1.0 / free_to_total(t.tso4, k.kso4),
            AlkalinityModel::ScaleCorrected => k.ph_factor_to_free,
        }
    }
}

/// Free to Total pH scale conversion factor.
pub fn free_to_total(tso4: f64, kso4: f64) -> f64 {
    1.0 + tso4 / kso4
}

/// Every contribution to total alkalinity of one sample (mol/kg-sw).
/// All fields are positive quantities; [`AlkalinityParts::total`] applies the signs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AlkalinityParts {
    pub hco3: f64,
    pub co3: f64,
    pub borate: f64,
    pub hydroxide: f64,
    pub phosphate: f64,
    pub silicate: f64,
    pub ammonia: f64,
    pub sulfide: f64,
    pub h_free: f64,
    pub hso4: f64,
    pub hf: f64,
}

impl AlkalinityParts {
    /// Total alkalinity: proton acceptors count positive, donors negative.
    pub fn total(&self) -> f64 {
        self.hco3
            + 2.0 * self.co3
            + self.borate
            + self.hydroxide
            + self.phosphate
            + self.silicate
            + self.ammonia
            + self.sulfide
            - self.h_free
            - self.hso4
            - self.hf
    }
}

/// Fraction `K/(K + H)` of a monoprotic acid present as its conjugate base.
fn base_fraction(total: f64, ka: f64, h: f64) -> f64 {
    total * ka / (ka + h)
}

/// Derivative of [`base_fraction`] in H.
fn base_fraction_slope(total: f64, ka: f64, h: f64) -> f64 {
    -total * ka / ((ka + h) * (ka + h))
}

fn parts_at_h(
    tc: f64,
    h: f64,
    free_factor: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> AlkalinityParts {
    let h_free = h * free_factor;
    AlkalinityParts {
        hco3: hco3_from_tc_h(tc, h, k),
        co3: carb_from_tc_h(tc, h, k),
        borate: base_fraction(t.tb, k.kb, h),
        hydroxide: k.kw / h,
        phosphate: phosphate_alkalinity(h, t, k),
        silicate: base_fraction(t.tsi, k.ksi, h),
        ammonia: base_fraction(t.tnh3, k.knh3, h),
        sulfide: base_fraction(t.th2s, k.kh2s, h),
        h_free,
        // KSO4 and KF are on the Free scale
        hso4: t.tso4 / (1.0 + k.kso4 / h_free),
        hf: t.tf / (1.0 + k.kf / h_free),
    }
}

/// Alkalinity contributions with [H+]free = H / `free_to_tot`.
pub fn alk_parts(
    tc: f64,
    ph: f64,
    free_to_tot: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> AlkalinityParts {
    parts_at_h(tc, h_from_ph(ph), 1.0 / free_to_tot, t, k)
}

/// Alkalinity contributions with [H+]free = H · `ph_factor_to_free`.
pub fn alkalinity_components(
    tc: f64,
    ph: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> AlkalinityParts {
    parts_at_h(tc, h_from_ph(ph), k.ph_factor_to_free, t, k)
}

/// Phosphate contribution to alkalinity: 2·PO4 + HPO4 − H3PO4.
pub fn phosphate_alkalinity(h: f64, t: &SampleTotals, k: &SampleConstants) -> f64 {
    let (kp1, kp2, kp3) = (k.kp1, k.kp2, k.kp3);
    t.tpo4 * (kp1 * kp2 * h + 2.0 * kp1 * kp2 * kp3 - h * h * h)
        / (h * h * h + kp1 * h * h + kp1 * kp2 * h + kp1 * kp2 * kp3)
}

fn phosphate_alkalinity_slope(h: f64, t: &SampleTotals, k: &SampleConstants) -> f64 {
    let (kp1, kp2, kp3) = (k.kp1, k.kp2, k.kp3);
    let num = kp1 * kp2 * h + 2.0 * kp1 * kp2 * kp3 - h * h * h;
    let den = h * h * h + kp1 * h * h + kp1 * kp2 * h + kp1 * kp2 * kp3;
    let dnum = kp1 * kp2 - 3.0 * h * h;
    let dden = 3.0 * h * h + 2.0 * kp1 * h + kp1 * kp2;
    t.tpo4 * (dnum * den - num * dden) / (den * den)
}

/// Speciation of total phosphate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PhosphateSpecies {
    pub po4: f64,
    pub hpo4: f64,
    pub h2po4: f64,
    pub h3po4: f64,
}

pub fn phosphate_components(ph: f64, t: &SampleTotals, k: &SampleConstants) -> PhosphateSpecies {
    let h = h_from_ph(ph);
    let (kp1, kp2, kp3) = (k.kp1, k.kp2, k.kp3);
    let den = h * h * h + kp1 * h * h + kp1 * kp2 * h + kp1 * kp2 * kp3;
    PhosphateSpecies {
        po4: t.tpo4 * kp1 * kp2 * kp3 / den,
        hpo4: t.tpo4 * kp1 * kp2 * h / den,
        h2po4: t.tpo4 * kp1 * h * h / den,
        h3po4: t.tpo4 * h * h * h / den,
    }
}

/// Total alkalinity from DIC and pH.
pub fn ta_from_tc_ph(
    model: AlkalinityModel,
    tc: f64,
    ph: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    match model {
        AlkalinityModel::Legacy => alk_parts(tc, ph, free_to_total(t.tso4, k.kso4), t, k).total(),
        AlkalinityModel::ScaleCorrected => alkalinity_components(tc, ph, t, k).total(),
    }
}

/// Everything in TA except HCO3 and CO3.
pub fn noncarbonate_alkalinity(
    h: f64,
    free_factor: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    parts_at_h(0.0, h, free_factor, t, k).total()
}

/// d/dH of [`noncarbonate_alkalinity`].
pub fn noncarbonate_alkalinity_slope(
    h: f64,
    free_factor: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    let h_free = h * free_factor;
    let hso4_slope = t.tso4 * k.kso4 * free_factor / ((h_free + k.kso4) * (h_free + k.kso4));
    let hf_slope = t.tf * k.kf * free_factor / ((h_free + k.kf) * (h_free + k.kf));
    base_fraction_slope(t.tb, k.kb, h) - k.kw / (h * h)
        + phosphate_alkalinity_slope(h, t, k)
        + base_fraction_slope(t.tsi, k.ksi, h)
        + base_fraction_slope(t.tnh3, k.knh3, h)
        + base_fraction_slope(t.th2s, k.kh2s, h)
        - free_factor
        - hso4_slope
        - hf_slope
}

/// Total alkalinity from pH and CO2 fugacity.
pub fn ta_from_ph_fco2(
    model: AlkalinityModel,
    ph: f64,
    fco2: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    ta_from_tc_ph(model, tc_from_ph_fco2(ph, fco2, k), ph, t, k)
}

/// Total alkalinity from pH and carbonate ion.
pub fn ta_from_ph_carb(
    model: AlkalinityModel,
    ph: f64,
    carb: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    ta_from_tc_ph(model, tc_from_ph_carb(ph, carb, k), ph, t, k)
}

/// Total alkalinity from pH and bicarbonate ion.
pub fn ta_from_ph_hco3(
    model: AlkalinityModel,
    ph: f64,
    hco3: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> f64 {
    ta_from_tc_ph(model, tc_from_ph_hco3(ph, hco3, k), ph, t, k)
}
