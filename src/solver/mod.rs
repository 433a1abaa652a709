//! Batch entry points of the carbonate-system solver.
//!
//! [`CarbonateSolver`] binds a validated [`Conditions`] batch and the
//! [`SolverOptions`] in force, and exposes one method per
//! `<target>_from_<known><known>` combination. Every method checks that its
//! inputs line up with the conditions, applies the scalar kernel to each
//! sample and returns a new array.
//!
//! Chemically impossible samples never fail a call. The rejecting inverters
//! and the Newton solves substitute NaN at the affected samples and log a
//! single warning per call.

pub mod analytic;
pub mod delta;
pub mod initialise;
pub mod newton;
pub mod system;

use log::warn;
use ndarray::Array1;

use crate::chemistry::alkalinity::{
    self, AlkalinityModel, AlkalinityParts, PhosphateSpecies, free_to_total,
};
use crate::chemistry::relations;
use crate::error::SolverError;
use crate::models::{Conditions, SampleConstants, SampleTotals, SolverOptions};
use newton::{NewtonSettings, PhSolution};

/// Alkalinity contributions for a batch, one array per term.
#[derive(Clone, Debug, PartialEq)]
pub struct AlkalinityBreakdown {
    pub hco3: Array1<f64>,
    pub co3: Array1<f64>,
    pub borate: Array1<f64>,
    pub hydroxide: Array1<f64>,
    pub phosphate: Array1<f64>,
    pub silicate: Array1<f64>,
    pub ammonia: Array1<f64>,
    pub sulfide: Array1<f64>,
    pub h_free: Array1<f64>,
    pub hso4: Array1<f64>,
    pub hf: Array1<f64>,
}

impl FromIterator<AlkalinityParts> for AlkalinityBreakdown {
    fn from_iter<I: IntoIterator<Item = AlkalinityParts>>(iter: I) -> Self {
        let parts: Vec<AlkalinityParts> = iter.into_iter().collect();
        let column = |f: fn(&AlkalinityParts) -> f64| -> Array1<f64> { parts.iter().map(f).collect() };
        Self {
            hco3: column(|p| p.hco3),
            co3: column(|p| p.co3),
            borate: column(|p| p.borate),
            hydroxide: column(|p| p.hydroxide),
            phosphate: column(|p| p.phosphate),
            silicate: column(|p| p.silicate),
            ammonia: column(|p| p.ammonia),
            sulfide: column(|p| p.sulfide),
            h_free: column(|p| p.h_free),
            hso4: column(|p| p.hso4),
            hf: column(|p| p.hf),
        }
    }
}

/// Wraps a two-argument kernel that only needs the equilibrium constants.
macro_rules! relation {
    ($(#[$meta:meta])* $name:ident($a:ident, $b:ident) => $kernel:path) => {
        $(#[$meta])*
        pub fn $name(
            &self,
            $a: &Array1<f64>,
            $b: &Array1<f64>,
        ) -> Result<Array1<f64>, SolverError> {
            self.map2((stringify!($a), $a), (stringify!($b), $b), |x, y, _, k| $kernel(x, y, k))
        }
    };
}

/// Solver bound to one batch of conditions.
#[derive(Clone, Debug)]
pub struct CarbonateSolver<'a> {
    conditions: &'a Conditions,
    options: SolverOptions,
}

impl<'a> CarbonateSolver<'a> {
    pub fn new(conditions: &'a Conditions) -> Self {
        Self {
            conditions,
            options: SolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options.normalized();
        self
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn conditions(&self) -> &'a Conditions {
        self.conditions
    }

    fn model(&self) -> AlkalinityModel {
        self.options.alkalinity_model
    }

    fn check(&self, name: &'static str, values: &Array1<f64>) -> Result<(), SolverError> {
        if values.len() == self.conditions.len() {
            Ok(())
        } else {
            Err(SolverError::LengthMismatch {
                name,
                expected: self.conditions.len(),
                found: values.len(),
            })
        }
    }

    fn map1<T, U, F>(&self, (name, a): (&'static str, &Array1<f64>), f: F) -> Result<U, SolverError>
    where
        U: FromIterator<T>,
        F: Fn(f64, &SampleTotals, &SampleConstants) -> T,
    {
        self.check(name, a)?;
        Ok((0..self.conditions.len())
            .map(|i| {
                let (t, k) = self.conditions.sample(i);
                f(a[i], &t, &k)
            })
            .collect())
    }

    fn map2<F>(
        &self,
        (a_name, a): (&'static str, &Array1<f64>),
        (b_name, b): (&'static str, &Array1<f64>),
        f: F,
    ) -> Result<Array1<f64>, SolverError>
    where
        F: Fn(f64, f64, &SampleTotals, &SampleConstants) -> f64,
    {
        self.check(a_name, a)?;
        self.check(b_name, b)?;
        Ok((0..self.conditions.len())
            .map(|i| {
                let (t, k) = self.conditions.sample(i);
                f(a[i], b[i], &t, &k)
            })
            .collect())
    }

    /// Like `map2` for kernels that may reject a sample. Rejected samples
    /// become NaN and are reported in one warning.
    fn map2_rejecting<F>(
        &self,
        (a_name, a): (&'static str, &Array1<f64>),
        (b_name, b): (&'static str, &Array1<f64>),
        diagnostic: &str,
        f: F,
    ) -> Result<Array1<f64>, SolverError>
    where
        F: Fn(f64, f64, &SampleTotals, &SampleConstants) -> Option<f64>,
    {
        self.check(a_name, a)?;
        self.check(b_name, b)?;
        let n = self.conditions.len();
        let mut rejected = 0usize;
        let out: Array1<f64> = (0..n)
            .map(|i| {
                let (t, k) = self.conditions.sample(i);
                f(a[i], b[i], &t, &k).unwrap_or_else(|| {
                    rejected += 1;
                    f64::NAN
                })
            })
            .collect();
        if rejected > 0 {
            warn!("{diagnostic}; returning NaN for {rejected} of {n} sample(s)");
        }
        Ok(out)
    }

    fn settings(&self) -> NewtonSettings {
        (&self.options).into()
    }

    fn finish_newton(&self, solution: PhSolution) -> Array1<f64> {
        let failed = solution.failed();
        if failed > 0 {
            warn!(
                "pH solver did not converge for {failed} of {} sample(s) within {} iterations; returning NaN",
                self.conditions.len(),
                solution.iterations
            );
        }
        solution.into_values()
    }
}

/// Equilibrium relations.
impl CarbonateSolver<'_> {
    relation! {
        /// Carbonate ion from DIC and [H+].
        carb_from_tc_h(tc, h) => relations::carb_from_tc_h
    }
    relation! {
        /// Carbonate ion from DIC and pH.
        carb_from_tc_ph(tc, ph) => relations::carb_from_tc_ph
    }
    relation! {
        /// Bicarbonate ion from DIC and [H+].
        hco3_from_tc_h(tc, h) => relations::hco3_from_tc_h
    }
    relation! {
        /// Bicarbonate ion from DIC and pH.
        hco3_from_tc_ph(tc, ph) => relations::hco3_from_tc_ph
    }
    relation! {
        /// DIC from pH and bicarbonate ion.
        tc_from_ph_hco3(ph, hco3) => relations::tc_from_ph_hco3
    }
    relation! {
        /// DIC from pH and carbonate ion.
        tc_from_ph_carb(ph, carb) => relations::tc_from_ph_carb
    }
    relation! {
        /// CO2 fugacity from DIC and pH.
        fco2_from_tc_ph(tc, ph) => relations::fco2_from_tc_ph
    }
    relation! {
        /// DIC from pH and CO2 fugacity.
        tc_from_ph_fco2(ph, fco2) => relations::tc_from_ph_fco2
    }
    relation! {
        /// CO2 fugacity from pH and carbonate ion.
        fco2_from_ph_carb(ph, carb) => relations::fco2_from_ph_carb
    }
    relation! {
        /// CO2 fugacity from pH and bicarbonate ion.
        fco2_from_ph_hco3(ph, hco3) => relations::fco2_from_ph_hco3
    }
    relation! {
        /// Bicarbonate ion from pH and CO2 fugacity.
        hco3_from_ph_fco2(ph, fco2) => relations::hco3_from_ph_fco2
    }
    relation! {
        /// Bicarbonate ion from pH and carbonate ion.
        hco3_from_ph_carb(ph, carb) => relations::hco3_from_ph_carb
    }
    relation! {
        /// Carbonate ion from pH and bicarbonate ion.
        carb_from_ph_hco3(ph, hco3) => relations::carb_from_ph_hco3
    }
    relation! {
        /// Carbonate ion from pH and CO2 fugacity.
        carb_from_ph_fco2(ph, fco2) => relations::carb_from_ph_fco2
    }
    relation! {
        /// Carbonate ion from CO2 fugacity and bicarbonate ion.
        carb_from_fco2_hco3(fco2, hco3) => relations::carb_from_fco2_hco3
    }
    relation! {
        /// CO2 fugacity from carbonate ion and bicarbonate ion.
        fco2_from_carb_hco3(carb, hco3) => relations::fco2_from_carb_hco3
    }
    relation! {
        /// DIC from CO2 fugacity and bicarbonate ion.
        tc_from_fco2_hco3(fco2, hco3) => relations::tc_from_fco2_hco3
    }

    /// Aqueous CO2 from CO2 fugacity.
    pub fn co2_from_fco2(&self, fco2: &Array1<f64>) -> Result<Array1<f64>, SolverError> {
        self.map1(("fco2", fco2), |x, _, k| relations::co2_from_fco2(x, k))
    }

    /// CO2 fugacity from aqueous CO2.
    pub fn fco2_from_co2(&self, co2: &Array1<f64>) -> Result<Array1<f64>, SolverError> {
        self.map1(("co2", co2), |x, _, k| relations::fco2_from_co2(x, k))
    }
}

/// Alkalinity.
impl CarbonateSolver<'_> {
    /// Free to Total pH scale conversion factor of every sample.
    pub fn free_to_total(&self) -> Array1<f64> {
        let t = self.conditions.totals();
        let k = self.conditions.constants();
        t.tso4
            .iter()
            .zip(k.kso4.iter())
            .map(|(&tso4, &kso4)| free_to_total(tso4, kso4))
            .collect()
    }

    /// Alkalinity contributions with [H+]free = H / `free_to_tot`.
    pub fn alk_parts(
        &self,
        tc: &Array1<f64>,
        ph: &Array1<f64>,
        free_to_tot: &Array1<f64>,
    ) -> Result<AlkalinityBreakdown, SolverError> {
        self.check("tc", tc)?;
        self.check("free_to_tot", free_to_tot)?;
        self.check("ph", ph)?;
        Ok((0..self.conditions.len())
            .map(|i| {
                let (t, k) = self.conditions.sample(i);
                alkalinity::alk_parts(tc[i], ph[i], free_to_tot[i], &t, &k)
            })
            .collect())
    }

    /// Alkalinity contributions with [H+]free = H · `ph_factor_to_free`.
    pub fn alkalinity_components(
        &self,
        tc: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<AlkalinityBreakdown, SolverError> {
        self.check("tc", tc)?;
        self.check("ph", ph)?;
        Ok((0..self.conditions.len())
            .map(|i| {
                let (t, k) = self.conditions.sample(i);
                alkalinity::alkalinity_components(tc[i], ph[i], &t, &k)
            })
            .collect())
    }

    /// Alkalinity contributions under the configured [`AlkalinityModel`].
    pub fn alkalinity_breakdown(
        &self,
        tc: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<AlkalinityBreakdown, SolverError> {
        match self.model() {
            AlkalinityModel::Legacy => self.alk_parts(tc, ph, &self.free_to_total()),
            AlkalinityModel::ScaleCorrected => self.alkalinity_components(tc, ph),
        }
    }

    /// Speciation of total phosphate at each pH.
    pub fn phosphate_components(
        &self,
        ph: &Array1<f64>,
    ) -> Result<Vec<PhosphateSpecies>, SolverError> {
        self.map1(("ph", ph), alkalinity::phosphate_components)
    }

    /// Total alkalinity from DIC and pH.
    pub fn ta_from_tc_ph(
        &self,
        tc: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let model = self.model();
        self.map2(("tc", tc), ("ph", ph), |x, y, t, k| {
            alkalinity::ta_from_tc_ph(model, x, y, t, k)
        })
    }

    /// Total alkalinity from pH and CO2 fugacity.
    pub fn ta_from_ph_fco2(
        &self,
        ph: &Array1<f64>,
        fco2: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let model = self.model();
        self.map2(("ph", ph), ("fco2", fco2), |x, y, t, k| {
            alkalinity::ta_from_ph_fco2(model, x, y, t, k)
        })
    }

    /// Total alkalinity from pH and carbonate ion.
    pub fn ta_from_ph_carb(
        &self,
        ph: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let model = self.model();
        self.map2(("ph", ph), ("carb", carb), |x, y, t, k| {
            alkalinity::ta_from_ph_carb(model, x, y, t, k)
        })
    }

    /// Total alkalinity from pH and bicarbonate ion.
    pub fn ta_from_ph_hco3(
        &self,
        ph: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let model = self.model();
        self.map2(("ph", ph), ("hco3", hco3), |x, y, t, k| {
            alkalinity::ta_from_ph_hco3(model, x, y, t, k)
        })
    }
}

/// Closed-form inverses.
impl CarbonateSolver<'_> {
    /// pH from DIC and CO2 fugacity. NaN where fCO2 is impossibly high.
    pub fn ph_from_tc_fco2(
        &self,
        tc: &Array1<f64>,
        fco2: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        self.map2_rejecting(
            ("tc", tc),
            ("fco2", fco2),
            "some input fCO2 values are impossibly high given the input DIC",
            |x, y, _, k| analytic::ph_from_tc_fco2(x, y, k),
        )
    }

    /// pH from DIC and carbonate ion. NaN where CO3 is impossibly high.
    pub fn ph_from_tc_carb(
        &self,
        tc: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        self.map2_rejecting(
            ("tc", tc),
            ("carb", carb),
            "some input CO3 values are impossibly high given the input DIC",
            |x, y, _, k| analytic::ph_from_tc_carb(x, y, k),
        )
    }

    /// pH from DIC and bicarbonate ion. NaN where HCO3 is impossibly high.
    pub fn ph_from_tc_hco3(
        &self,
        tc: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        self.map2_rejecting(
            ("tc", tc),
            ("hco3", hco3),
            "some input HCO3 values are impossibly high given the input DIC",
            |x, y, _, k| analytic::ph_from_tc_hco3(x, y, k),
        )
    }

    /// DIC from total alkalinity and pH. NaN where the implied DIC is negative.
    pub fn tc_from_ta_ph(
        &self,
        ta: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let model = self.model();
        self.map2_rejecting(
            ("ta", ta),
            ("ph", ph),
            "some input pH values are impossibly high given the input alkalinity",
            |x, y, t, k| analytic::tc_from_ta_ph(model, x, y, t, k),
        )
    }

    relation! {
        /// pH from CO2 fugacity and carbonate ion.
        ph_from_fco2_carb(fco2, carb) => analytic::ph_from_fco2_carb
    }
    relation! {
        /// pH from CO2 fugacity and bicarbonate ion.
        ph_from_fco2_hco3(fco2, hco3) => analytic::ph_from_fco2_hco3
    }
    relation! {
        /// pH from carbonate ion and bicarbonate ion.
        ph_from_carb_hco3(carb, hco3) => analytic::ph_from_carb_hco3
    }
}

/// Iterative pH from alkalinity.
impl CarbonateSolver<'_> {
    /// pH from total alkalinity and DIC, with per-sample status.
    pub fn ph_from_ta_tc_detailed(
        &self,
        ta: &Array1<f64>,
        tc: &Array1<f64>,
    ) -> Result<PhSolution, SolverError> {
        let model = self.model();
        newton::solve_ph(
            ta,
            tc,
            self.conditions,
            &self.settings(),
            |a, x, t, k| initialise::from_tc(a, x, t.tb, k.k1, k.k2, k.kb),
            |ph, a, x, t, k| delta::ph_from_ta_tc(ph, a, x, model, t, k),
        )
    }

    /// pH from total alkalinity and CO2 fugacity, with per-sample status.
    pub fn ph_from_ta_fco2_detailed(
        &self,
        ta: &Array1<f64>,
        fco2: &Array1<f64>,
    ) -> Result<PhSolution, SolverError> {
        let model = self.model();
        newton::solve_ph(
            ta,
            fco2,
            self.conditions,
            &self.settings(),
            // the initial guess wants aqueous CO2
            |a, x, t, k| {
                initialise::from_co2(a, relations::co2_from_fco2(x, k), t.tb, k.k1, k.k2, k.kb)
            },
            |ph, a, x, t, k| delta::ph_from_ta_fco2(ph, a, x, model, t, k),
        )
    }

    /// pH from total alkalinity and carbonate ion, with per-sample status.
    pub fn ph_from_ta_carb_detailed(
        &self,
        ta: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<PhSolution, SolverError> {
        let model = self.model();
        newton::solve_ph(
            ta,
            carb,
            self.conditions,
            &self.settings(),
            |a, x, t, k| initialise::from_co3(a, x, t.tb, k.k1, k.k2, k.kb),
            |ph, a, x, t, k| delta::ph_from_ta_carb(ph, a, x, model, t, k),
        )
    }

    /// pH from total alkalinity and bicarbonate ion, with per-sample status.
    pub fn ph_from_ta_hco3_detailed(
        &self,
        ta: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<PhSolution, SolverError> {
        let model = self.model();
        newton::solve_ph(
            ta,
            hco3,
            self.conditions,
            &self.settings(),
            |a, x, t, k| initialise::from_hco3(a, x, t.tb, k.k1, k.k2, k.kb),
            |ph, a, x, t, k| delta::ph_from_ta_hco3(ph, a, x, model, t, k),
        )
    }

    /// pH from total alkalinity and DIC.
    pub fn ph_from_ta_tc(
        &self,
        ta: &Array1<f64>,
        tc: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        Ok(self.finish_newton(self.ph_from_ta_tc_detailed(ta, tc)?))
    }

    /// pH from total alkalinity and CO2 fugacity.
    pub fn ph_from_ta_fco2(
        &self,
        ta: &Array1<f64>,
        fco2: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        Ok(self.finish_newton(self.ph_from_ta_fco2_detailed(ta, fco2)?))
    }

    /// pH from total alkalinity and carbonate ion.
    pub fn ph_from_ta_carb(
        &self,
        ta: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        Ok(self.finish_newton(self.ph_from_ta_carb_detailed(ta, carb)?))
    }

    /// pH from total alkalinity and bicarbonate ion.
    pub fn ph_from_ta_hco3(
        &self,
        ta: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        Ok(self.finish_newton(self.ph_from_ta_hco3_detailed(ta, hco3)?))
    }
}

/// Two-step compositions: solve for pH or DIC first, then apply a relation.
impl CarbonateSolver<'_> {
    pub fn fco2_from_ta_tc(
        &self,
        ta: &Array1<f64>,
        tc: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_ta_tc(ta, tc)?;
        self.fco2_from_tc_ph(tc, &ph)
    }

    pub fn fco2_from_ta_ph(
        &self,
        ta: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let tc = self.tc_from_ta_ph(ta, ph)?;
        self.fco2_from_tc_ph(&tc, ph)
    }

    pub fn carb_from_ta_tc(
        &self,
        ta: &Array1<f64>,
        tc: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_ta_tc(ta, tc)?;
        self.carb_from_tc_ph(tc, &ph)
    }

    pub fn carb_from_ta_ph(
        &self,
        ta: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let tc = self.tc_from_ta_ph(ta, ph)?;
        self.carb_from_tc_ph(&tc, ph)
    }

    pub fn hco3_from_ta_ph(
        &self,
        ta: &Array1<f64>,
        ph: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let tc = self.tc_from_ta_ph(ta, ph)?;
        self.hco3_from_tc_ph(&tc, ph)
    }

    pub fn ta_from_fco2_carb(
        &self,
        fco2: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_fco2_carb(fco2, carb)?;
        self.ta_from_ph_fco2(&ph, fco2)
    }

    pub fn tc_from_fco2_carb(
        &self,
        fco2: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_fco2_carb(fco2, carb)?;
        self.tc_from_ph_carb(&ph, carb)
    }

    pub fn hco3_from_fco2_carb(
        &self,
        fco2: &Array1<f64>,
        carb: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_fco2_carb(fco2, carb)?;
        self.hco3_from_ph_carb(&ph, carb)
    }

    pub fn ta_from_fco2_hco3(
        &self,
        fco2: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let carb = self.carb_from_fco2_hco3(fco2, hco3)?;
        self.ta_from_fco2_carb(fco2, &carb)
    }

    pub fn ta_from_carb_hco3(
        &self,
        carb: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_carb_hco3(carb, hco3)?;
        self.ta_from_ph_carb(&ph, carb)
    }

    pub fn tc_from_carb_hco3(
        &self,
        carb: &Array1<f64>,
        hco3: &Array1<f64>,
    ) -> Result<Array1<f64>, SolverError> {
        let ph = self.ph_from_carb_hco3(carb, hco3)?;
        self.tc_from_ph_carb(&ph, carb)
    }
}
