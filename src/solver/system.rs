//! Complete carbonate system from any two known quantities.

use log::debug;
use ndarray::Array1;

use super::CarbonateSolver;
use crate::error::SolverError;
use crate::models::{CarbonateSystem, Parameter};

/// Position of a parameter in the canonical pair order. Aqueous CO2 is
/// converted to fCO2 before ranking.
fn rank(p: Parameter) -> u8 {
    match p {
        Parameter::Alkalinity => 0,
        Parameter::Dic => 1,
        Parameter::Ph => 2,
        Parameter::Fco2 | Parameter::AqueousCo2 => 3,
        Parameter::Bicarbonate => 4,
        Parameter::Carbonate => 5,
    }
}

/// Solve for pH and DIC from a canonically ordered pair.
fn ph_and_dic(
    solver: &CarbonateSolver<'_>,
    (p1, v1): (Parameter, &Array1<f64>),
    (p2, v2): (Parameter, &Array1<f64>),
) -> Result<(Array1<f64>, Array1<f64>), SolverError> {
    use Parameter::*;
    Ok(match (p1, p2) {
        (Alkalinity, Dic) => (solver.ph_from_ta_tc(v1, v2)?, v2.clone()),
        (Alkalinity, Ph) => (v2.clone(), solver.tc_from_ta_ph(v1, v2)?),
        (Alkalinity, Fco2) => {
            let ph = solver.ph_from_ta_fco2(v1, v2)?;
            let dic = solver.tc_from_ph_fco2(&ph, v2)?;
            (ph, dic)
        }
        (Alkalinity, Bicarbonate) => {
            let ph = solver.ph_from_ta_hco3(v1, v2)?;
            let dic = solver.tc_from_ph_hco3(&ph, v2)?;
            (ph, dic)
        }
        (Alkalinity, Carbonate) => {
            let ph = solver.ph_from_ta_carb(v1, v2)?;
            let dic = solver.tc_from_ph_carb(&ph, v2)?;
            (ph, dic)
        }
        (Dic, Ph) => (v2.clone(), v1.clone()),
        (Dic, Fco2) => (solver.ph_from_tc_fco2(v1, v2)?, v1.clone()),
        (Dic, Bicarbonate) => (solver.ph_from_tc_hco3(v1, v2)?, v1.clone()),
        (Dic, Carbonate) => (solver.ph_from_tc_carb(v1, v2)?, v1.clone()),
        (Ph, Fco2) => (v1.clone(), solver.tc_from_ph_fco2(v1, v2)?),
        (Ph, Bicarbonate) => (v1.clone(), solver.tc_from_ph_hco3(v1, v2)?),
        (Ph, Carbonate) => (v1.clone(), solver.tc_from_ph_carb(v1, v2)?),
        (Fco2, Bicarbonate) => (
            solver.ph_from_fco2_hco3(v1, v2)?,
            solver.tc_from_fco2_hco3(v1, v2)?,
        ),
        (Fco2, Carbonate) => (
            solver.ph_from_fco2_carb(v1, v2)?,
            solver.tc_from_fco2_carb(v1, v2)?,
        ),
        (Bicarbonate, Carbonate) => (
            solver.ph_from_carb_hco3(v2, v1)?,
            solver.tc_from_carb_hco3(v2, v1)?,
        ),
        _ => return Err(SolverError::UnsupportedPair(p1, p2)),
    })
}

/// Every carbonate-system quantity from two known ones, in internal units.
///
/// The known values are echoed back unchanged in the result. Pairs of the
/// same kind, including aqueous CO2 with fCO2, are rejected.
pub fn solve_system(
    solver: &CarbonateSolver<'_>,
    par1_type: Parameter,
    par1: &Array1<f64>,
    par2_type: Parameter,
    par2: &Array1<f64>,
) -> Result<CarbonateSystem, SolverError> {
    if rank(par1_type) == rank(par2_type) {
        return Err(SolverError::UnsupportedPair(par1_type, par2_type));
    }
    let as_fco2 = |p: Parameter,
                   v: &Array1<f64>|
     -> Result<(Parameter, Array1<f64>), SolverError> {
        match p {
            Parameter::AqueousCo2 => Ok((Parameter::Fco2, solver.fco2_from_co2(v)?)),
            _ => Ok((p, v.clone())),
        }
    };
    let mut first = as_fco2(par1_type, par1)?;
    let mut second = as_fco2(par2_type, par2)?;
    if rank(first.0) > rank(second.0) {
        std::mem::swap(&mut first, &mut second);
    }
    debug!("solving carbonate system from {} and {}", first.0, second.0);

    let (ph, dic) = ph_and_dic(solver, (first.0, &first.1), (second.0, &second.1))?;
    let fco2 = solver.fco2_from_tc_ph(&dic, &ph)?;
    let mut system = CarbonateSystem {
        alkalinity: solver.ta_from_tc_ph(&dic, &ph)?,
        bicarbonate: solver.hco3_from_tc_ph(&dic, &ph)?,
        carbonate: solver.carb_from_tc_ph(&dic, &ph)?,
        aqueous_co2: solver.co2_from_fco2(&fco2)?,
        fco2,
        ph,
        dic,
    };
    for (p, v) in [(par1_type, par1), (par2_type, par2)] {
        let slot = match p {
            Parameter::Alkalinity => &mut system.alkalinity,
            Parameter::Dic => &mut system.dic,
            Parameter::Ph => &mut system.ph,
            Parameter::Fco2 => &mut system.fco2,
            Parameter::Bicarbonate => &mut system.bicarbonate,
            Parameter::Carbonate => &mut system.carbonate,
            Parameter::AqueousCo2 => &mut system.aqueous_co2,
        };
        slot.assign(v);
    }
    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conditions, SampleConstants, SampleTotals};

    fn conditions(n: usize) -> Conditions {
        Conditions::uniform(
            n,
            SampleTotals {
                tb: 4.16e-4,
                tpo4: 1e-6,
                tsi: 5e-6,
                tso4: 0.02824,
                tf: 6.8e-5,
                ..Default::default()
            },
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
            },
        )
    }

    fn close(a: &Array1<f64>, b: &Array1<f64>, rel: f64) -> bool {
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| ((x - y) / y).abs() < rel)
    }

    #[test]
    fn every_pair_reproduces_the_reference_system() {
        let cond = conditions(1);
        let solver = CarbonateSolver::new(&cond);
        let reference = solve_system(
            &solver,
            Parameter::Dic,
            &Array1::from_elem(1, 2000e-6),
            Parameter::Ph,
            &Array1::from_elem(1, 8.0),
        )
        .unwrap();
        let value = |p: Parameter| match p {
            Parameter::Alkalinity => reference.alkalinity.clone(),
            Parameter::Dic => reference.dic.clone(),
            Parameter::Ph => reference.ph.clone(),
            Parameter::Fco2 => reference.fco2.clone(),
            Parameter::Bicarbonate => reference.bicarbonate.clone(),
            Parameter::Carbonate => reference.carbonate.clone(),
            Parameter::AqueousCo2 => reference.aqueous_co2.clone(),
        };
        let all = [
            Parameter::Alkalinity,
            Parameter::Dic,
            Parameter::Ph,
            Parameter::Fco2,
            Parameter::Bicarbonate,
            Parameter::Carbonate,
            Parameter::AqueousCo2,
        ];
        for (i, &a) in all.iter().enumerate() {
            for &b in &all[i + 1..] {
                if rank(a) == rank(b) {
                    continue;
                }
                let s = solve_system(&solver, b, &value(b), a, &value(a)).unwrap();
                assert!((s.ph[0] - 8.0).abs() < 1e-6, "{a}/{b}: pH {}", s.ph[0]);
                assert!(close(&s.dic, &reference.dic, 1e-6), "{a}/{b}: dic");
                assert!(close(&s.alkalinity, &reference.alkalinity, 1e-6), "{a}/{b}: ta");
                assert!(close(&s.carbonate, &reference.carbonate, 1e-5), "{a}/{b}: co3");
            }
        }
    }

    #[test]
    fn same_kind_pairs_are_unsupported() {
        let cond = conditions(1);
        let solver = CarbonateSolver::new(&cond);
        let v = Array1::from_elem(1, 400e-6);
        assert_eq!(
            solve_system(&solver, Parameter::Fco2, &v, Parameter::AqueousCo2, &v),
            Err(SolverError::UnsupportedPair(
                Parameter::Fco2,
                Parameter::AqueousCo2
            ))
        );
        assert!(matches!(
            solve_system(&solver, Parameter::Dic, &v, Parameter::Dic, &v),
            Err(SolverError::UnsupportedPair(..))
        ));
    }

    #[test]
    fn known_inputs_are_echoed() {
        let cond = conditions(2);
        let solver = CarbonateSolver::new(&cond);
        let ta = Array1::from(vec![2300e-6, 2250e-6]);
        let tc = Array1::from(vec![2000e-6, 2050e-6]);
        let s = solve_system(&solver, Parameter::Alkalinity, &ta, Parameter::Dic, &tc).unwrap();
        assert_eq!(s.alkalinity, ta);
        assert_eq!(s.dic, tc);
        assert!((s.ph[0] - 8.033).abs() < 0.01);
    }
}
