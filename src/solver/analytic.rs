//! Closed-form inverses for pairs where [H+] (or DIC) can be isolated
//! algebraically.
//!
//! The rejecting inverters return `None` for a sample whose inputs are
//! chemically impossible together. NaN inputs fall through every comparison
//! and come back as `Some(NaN)`, so they are not counted as rejections.

use crate::chemistry::alkalinity::{AlkalinityModel, ta_from_tc_ph};
use crate::chemistry::{h_from_ph, ph_from_h};
use crate::models::{SampleConstants, SampleTotals};

/// pH from DIC and CO2 fugacity: the quadratic in H of
/// K0·fCO2 = TC·H²/(H² + K1·H + K1·K2).
///
/// `None` when fCO2 is too high for the DIC (RR ≥ 1 or no real root).
pub fn ph_from_tc_fco2(tc: f64, fco2: f64, k: &SampleConstants) -> Option<f64> {
    let rr = k.k0 * fco2 / tc;
    let discr = (k.k1 * rr).powi(2) + 4.0 * (1.0 - rr) * k.k1 * k.k2 * rr;
    if rr >= 1.0 || discr <= 0.0 {
        return None;
    }
    Some(ph_from_h(0.5 * (k.k1 * rr + discr.sqrt()) / (1.0 - rr)))
}

/// pH from DIC and carbonate ion: TC·K1·K2 = CO3·(H² + K1·H + K1·K2).
///
/// `None` when CO3 ≥ DIC or there is no real root.
pub fn ph_from_tc_carb(tc: f64, carb: f64, k: &SampleConstants) -> Option<f64> {
    let rr = 1.0 - tc / carb;
    let discr = k.k1 * k.k1 - 4.0 * k.k1 * k.k2 * rr;
    if carb >= tc || discr <= 0.0 {
        return None;
    }
    Some(ph_from_h((-k.k1 + discr.sqrt()) / 2.0))
}

/// pH from DIC and bicarbonate ion: (HCO3/K1)·H² + (HCO3 − TC)·H + HCO3·K2 = 0.
///
/// Takes the low-[H+] root. `None` when HCO3 ≥ DIC or there is no real root.
pub fn ph_from_tc_hco3(tc: f64, hco3: f64, k: &SampleConstants) -> Option<f64> {
    let a = hco3 / k.k1;
    let b = hco3 - tc;
    let c = hco3 * k.k2;
    let discr = b * b - 4.0 * a * c;
    if hco3 >= tc || discr <= 0.0 {
        return None;
    }
    Some(ph_from_h((-b - discr.sqrt()) / (2.0 * a)))
}

/// pH from CO2 fugacity and carbonate ion: K0·K1·K2·fCO2 = CO3·H².
pub fn ph_from_fco2_carb(fco2: f64, carb: f64, k: &SampleConstants) -> f64 {
    ph_from_h((k.k0 * k.k1 * k.k2 * fco2 / carb).sqrt())
}

/// pH from CO2 fugacity and bicarbonate ion.
pub fn ph_from_fco2_hco3(fco2: f64, hco3: f64, k: &SampleConstants) -> f64 {
    ph_from_h(k.k0 * k.k1 * fco2 / hco3)
}

/// pH from carbonate ion and bicarbonate ion.
pub fn ph_from_carb_hco3(carb: f64, hco3: f64, k: &SampleConstants) -> f64 {
    ph_from_h(k.k2 * hco3 / carb)
}

/// DIC from total alkalinity and pH.
///
/// The non-carbonate alkalinity is TA evaluated at zero DIC; what is left is
/// carbonate alkalinity, which is linear in DIC at fixed pH. `None` when the
/// non-carbonate part alone exceeds TA, which would mean negative DIC.
pub fn tc_from_ta_ph(
    model: AlkalinityModel,
    ta: f64,
    ph: f64,
    t: &SampleTotals,
    k: &SampleConstants,
) -> Option<f64> {
    let ta_tc0 = ta_from_tc_ph(model, 0.0, ph, t, k);
    if ta_tc0 > ta {
        return None;
    }
    let carbonate_alkalinity = ta - ta_tc0;
    let h = h_from_ph(ph);
    Some(
        carbonate_alkalinity * (h * h + k.k1 * h + k.k1 * k.k2)
            / (k.k1 * (h + 2.0 * k.k2)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::relations::{
        carb_from_tc_ph, fco2_from_ph_carb, fco2_from_tc_ph, hco3_from_tc_ph,
    };

    fn totals() -> SampleTotals {
        SampleTotals {
            tb: 4.16e-4,
            tso4: 0.02824,
            tf: 6.8e-5,
            ..Default::default()
        }
    }

    fn k() -> SampleConstants {
        SampleConstants {
            k0: 0.02839,
            k1: 1.42e-6,
            k2: 1.12e-9,
            kb: 2.53e-9,
            kw: 6.0e-14,
            kp1: 0.0244,
            kp2: 1.08e-6,
            kp3: 1.62e-9,
            ksi: 4.1e-10,
            knh3: 5.6e-10,
            kh2s: 1.05e-7,
            kso4: 0.102,
            kf: 2.4e-3,
            ph_factor_to_free: 1.0 / (1.0 + 0.02824 / 0.102),
        }
    }

    #[test]
    fn dic_pairs_recover_ph() {
        let k = k();
        let (tc, ph) = (2000e-6, 8.03);
        let fco2 = fco2_from_tc_ph(tc, ph, &k);
        let carb = carb_from_tc_ph(tc, ph, &k);
        let hco3 = hco3_from_tc_ph(tc, ph, &k);
        assert!((ph_from_tc_fco2(tc, fco2, &k).unwrap() - ph).abs() < 1e-10);
        assert!((ph_from_tc_carb(tc, carb, &k).unwrap() - ph).abs() < 1e-10);
        assert!((ph_from_tc_hco3(tc, hco3, &k).unwrap() - ph).abs() < 1e-10);
    }

    #[test]
    fn ion_pairs_recover_ph() {
        let k = k();
        let (tc, ph) = (2000e-6, 7.7);
        let fco2 = fco2_from_tc_ph(tc, ph, &k);
        let carb = carb_from_tc_ph(tc, ph, &k);
        let hco3 = hco3_from_tc_ph(tc, ph, &k);
        assert!((ph_from_fco2_carb(fco2, carb, &k) - ph).abs() < 1e-12);
        assert!((ph_from_fco2_hco3(fco2, hco3, &k) - ph).abs() < 1e-12);
        assert!((ph_from_carb_hco3(carb, hco3, &k) - ph).abs() < 1e-12);
    }

    #[test]
    fn fco2_carb_inverse_is_exact() {
        let k = k();
        let (fco2, carb) = (400e-6, 200e-6);
        let ph = ph_from_fco2_carb(fco2, carb, &k);
        let back = fco2_from_ph_carb(ph, carb, &k);
        assert!(((back - fco2) / fco2).abs() < 1e-13);
    }

    #[test]
    fn impossible_pairs_are_rejected() {
        let k = k();
        // RR = K0·fCO2/TC ≥ 1
        assert_eq!(ph_from_tc_fco2(100e-6, 4000e-6, &k), None);
        assert_eq!(ph_from_tc_carb(100e-6, 150e-6, &k), None);
        assert_eq!(ph_from_tc_hco3(100e-6, 100e-6, &k), None);
    }

    #[test]
    fn nan_is_not_a_rejection() {
        let k = k();
        assert!(ph_from_tc_fco2(f64::NAN, 400e-6, &k).unwrap().is_nan());
        assert!(ph_from_tc_carb(2000e-6, f64::NAN, &k).unwrap().is_nan());
    }

    #[test]
    fn dic_from_alkalinity_round_trips() {
        let (t, k) = (totals(), k());
        let m = AlkalinityModel::Legacy;
        let ta = ta_from_tc_ph(m, 2000e-6, 8.0, &t, &k);
        let tc = tc_from_ta_ph(m, ta, 8.0, &t, &k).unwrap();
        assert!((tc - 2000e-6).abs() < 1e-12);
    }

    #[test]
    fn negative_dic_is_rejected() {
        let (t, k) = (totals(), k());
        // Borate and hydroxide alone exceed 50 µmol/kg at pH 9.
        assert_eq!(
            tc_from_ta_ph(AlkalinityModel::Legacy, 50e-6, 9.0, &t, &k),
            None
        );
    }
}
