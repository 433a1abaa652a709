//! First pH guesses for the alkalinity solvers.
//!
//! Alkalinity is approximated by its carbonate and borate terms only, which
//! turns each TA/partner pair into a cubic or quadratic in [H+]. For the
//! cubics the root is estimated from the local minimum of the polynomial
//! (Munhoven 2013, section 3.2), which lands within a few hundredths of a pH
//! unit of the answer for seawater. Outside the range where the approximate
//! polynomial has a positive root a fixed guess is returned and the damped
//! Newton iteration walks in from there.

use crate::chemistry::ph_from_h;

/// Returned when alkalinity is zero or negative.
const PH_ACIDIC: f64 = 3.0;
/// Returned when alkalinity exceeds what the partner variable can carry.
const PH_BASIC: f64 = 10.0;
/// Returned when the cubic has no usable minimum.
const H_NEUTRAL: f64 = 1e-7;

/// Positive root of H³ + c2·H² + c1·H + c0 with c0 < 0, from a quadratic
/// expansion around the local minimum.
fn cubic_root_near_minimum(c2: f64, c1: f64, c0: f64) -> f64 {
    let c21 = c2 * c2 - 3.0 * c1;
    if c21 <= 0.0 {
        return H_NEUTRAL;
    }
    let sq21 = c21.sqrt();
    let h_min = if c2 < 0.0 {
        (-c2 + sq21) / 3.0
    } else {
        -c1 / (c2 + sq21)
    };
    let p_min = ((h_min + c2) * h_min + c1) * h_min + c0;
    if p_min >= 0.0 {
        return H_NEUTRAL;
    }
    h_min + (-p_min / sq21).sqrt()
}

/// Larger root of a·H² + b·H + c.
fn positive_quadratic_root(a: f64, b: f64, c: f64) -> f64 {
    (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a)
}

/// Initial pH for the TA/DIC solver.
pub fn from_tc(alkalinity: f64, tc: f64, tb: f64, k1: f64, k2: f64, kb: f64) -> f64 {
    if alkalinity <= 0.0 {
        return PH_ACIDIC;
    }
    if alkalinity >= 2.0 * tc + tb {
        return PH_BASIC;
    }
    let tb_a = tb / alkalinity;
    let tc_a = tc / alkalinity;
    let c2 = kb * (1.0 - tb_a) + k1 * (1.0 - tc_a);
    let c1 = k1 * (kb * (1.0 - tb_a - tc_a) + k2 * (1.0 - 2.0 * tc_a));
    let c0 = k1 * k2 * kb * (1.0 - (2.0 * tc + tb) / alkalinity);
    ph_from_h(cubic_root_near_minimum(c2, c1, c0))
}

/// Initial pH for the TA/CO2 solver. Takes aqueous CO2, not fCO2.
pub fn from_co2(alkalinity: f64, co2: f64, tb: f64, k1: f64, k2: f64, kb: f64) -> f64 {
    if alkalinity <= 0.0 {
        return PH_ACIDIC;
    }
    let c2 = kb - (tb * kb + k1 * co2) / alkalinity;
    let c1 = -k1 * co2 * (kb + 2.0 * k2) / alkalinity;
    let c0 = -2.0 * k1 * k2 * kb * co2 / alkalinity;
    ph_from_h(cubic_root_near_minimum(c2, c1, c0))
}

/// Initial pH for the TA/carbonate ion solver.
pub fn from_co3(alkalinity: f64, co3: f64, tb: f64, _k1: f64, k2: f64, kb: f64) -> f64 {
    if alkalinity <= 2.0 * co3 + tb {
        return PH_BASIC;
    }
    let a = co3;
    let b = k2 * (2.0 * co3 - alkalinity) + co3 * kb;
    let c = k2 * kb * (2.0 * co3 + tb - alkalinity);
    ph_from_h(positive_quadratic_root(a, b, c))
}

/// Initial pH for the TA/bicarbonate ion solver.
pub fn from_hco3(alkalinity: f64, hco3: f64, tb: f64, _k1: f64, k2: f64, kb: f64) -> f64 {
    if alkalinity <= hco3 {
        return PH_ACIDIC;
    }
    let a = alkalinity - hco3;
    let b = a * kb - 2.0 * k2 * hco3 - tb * kb;
    let c = -2.0 * k2 * kb * hco3;
    ph_from_h(positive_quadratic_root(a, b, c))
}
