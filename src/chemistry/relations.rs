//! Pairwise relations between DIC, pH, fCO2, bicarbonate and carbonate.
//!
//! Each function expresses one quantity from two others using K0, K1 and K2
//! only. Names read `<target>_from_<known><known>`.

use super::h_from_ph;
use crate::models::SampleConstants;

/// H² + K1·H + K1·K2, the common denominator of DIC speciation.
fn speciation_denominator(h: f64, k: &SampleConstants) -> f64 {
    h * h + k.k1 * h + k.k1 * k.k2
}

/// Carbonate ion from DIC and [H+].
pub fn carb_from_tc_h(tc: f64, h: f64, k: &SampleConstants) -> f64 {
    tc * k.k1 * k.k2 / speciation_denominator(h, k)
}

/// Carbonate ion from DIC and pH.
pub fn carb_from_tc_ph(tc: f64, ph: f64, k: &SampleConstants) -> f64 {
    carb_from_tc_h(tc, h_from_ph(ph), k)
}

/// Bicarbonate ion from DIC and [H+].
pub fn hco3_from_tc_h(tc: f64, h: f64, k: &SampleConstants) -> f64 {
    tc * k.k1 * h / speciation_denominator(h, k)
}

/// Bicarbonate ion from DIC and pH.
pub fn hco3_from_tc_ph(tc: f64, ph: f64, k: &SampleConstants) -> f64 {
    hco3_from_tc_h(tc, h_from_ph(ph), k)
}

/// Carbonate alkalinity (HCO3 + 2·CO3) from DIC and [H+].
pub fn carbonate_alkalinity_from_tc_h(tc: f64, h: f64, k: &SampleConstants) -> f64 {
    tc * k.k1 * (h + 2.0 * k.k2) / speciation_denominator(h, k)
}

/// d(HCO3 + 2·CO3)/dH at fixed DIC.
pub fn carbonate_alkalinity_slope_tc(tc: f64, h: f64, k: &SampleConstants) -> f64 {
    let d = speciation_denominator(h, k);
    -tc * k.k1 * (h * h + 4.0 * k.k2 * h + k.k1 * k.k2) / (d * d)
}

/// DIC from pH and bicarbonate ion.
pub fn tc_from_ph_hco3(ph: f64, hco3: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    hco3 * (1.0 + h / k.k1 + k.k2 / h)
}

/// DIC from pH and carbonate ion.
pub fn tc_from_ph_carb(ph: f64, carb: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    carb * (1.0 + h / k.k2 + h * h / (k.k1 * k.k2))
}

/// CO2 fugacity from DIC and pH.
pub fn fco2_from_tc_ph(tc: f64, ph: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    tc * h * h / speciation_denominator(h, k) / k.k0
}

/// DIC from pH and CO2 fugacity.
pub fn tc_from_ph_fco2(ph: f64, fco2: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    k.k0 * fco2 * speciation_denominator(h, k) / (h * h)
}

/// CO2 fugacity from pH and carbonate ion.
pub fn fco2_from_ph_carb(ph: f64, carb: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    carb * h * h / (k.k0 * k.k1 * k.k2)
}

/// CO2 fugacity from pH and bicarbonate ion.
pub fn fco2_from_ph_hco3(ph: f64, hco3: f64, k: &SampleConstants) -> f64 {
    let h = h_from_ph(ph);
    hco3 * h / (k.k0 * k.k1)
}

/// Bicarbonate ion from pH and CO2 fugacity.
pub fn hco3_from_ph_fco2(ph: f64, fco2: f64, k: &SampleConstants) -> f64 {
    k.k0 * k.k1 * fco2 / h_from_ph(ph)
}

/// Bicarbonate ion from pH and carbonate ion.
pub fn hco3_from_ph_carb(ph: f64, carb: f64, k: &SampleConstants) -> f64 {
    carb * h_from_ph(ph) / k.k2
}

/// Carbonate ion from pH and bicarbonate ion.
pub fn carb_from_ph_hco3(ph: f64, hco3: f64, k: &SampleConstants) -> f64 {
    k.k2 * hco3 / h_from_ph(ph)
}

/// Carbonate ion from pH and CO2 fugacity.
pub fn carb_from_ph_fco2(ph: f64, fco2: f64, k: &SampleConstants) -> f64 {
    carb_from_tc_ph(tc_from_ph_fco2(ph, fco2, k), ph, k)
}

/// Carbonate ion from CO2 fugacity and bicarbonate ion.
pub fn carb_from_fco2_hco3(fco2: f64, hco3: f64, k: &SampleConstants) -> f64 {
    hco3 * hco3 * k.k2 / (k.k0 * fco2 * k.k1)
}

/// CO2 fugacity from carbonate ion and bicarbonate ion.
pub fn fco2_from_carb_hco3(carb: f64, hco3: f64, k: &SampleConstants) -> f64 {
    hco3 * hco3 * k.k2 / (carb * k.k1 * k.k0)
}

/// DIC from CO2 fugacity and bicarbonate ion.
pub fn tc_from_fco2_hco3(fco2: f64, hco3: f64, k: &SampleConstants) -> f64 {
    k.k0 * fco2 + hco3 + carb_from_fco2_hco3(fco2, hco3, k)
}

/// Aqueous CO2 from CO2 fugacity.
pub fn co2_from_fco2(fco2: f64, k: &SampleConstants) -> f64 {
    k.k0 * fco2
}

/// CO2 fugacity from aqueous CO2.
pub fn fco2_from_co2(co2: f64, k: &SampleConstants) -> f64 {
    co2 / k.k0
}
