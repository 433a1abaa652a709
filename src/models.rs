use core::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::chemistry::alkalinity::{AlkalinityModel, free_to_total};
use crate::chemistry::{MAX_ITERATIONS, PH_TOLERANCE};
use crate::error::SolverError;

/// Declares a per-sample record of named `f64` fields together with its
/// struct-of-arrays batch counterpart.
macro_rules! batch_record {
    (
        $(#[$sample_meta:meta])*
        sample $sample:ident;
        $(#[$batch_meta:meta])*
        batch $batch:ident {
            $( $(#[$field_meta:meta])* $field:ident ),+ $(,)?
        }
    ) => {
        $(#[$sample_meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
        pub struct $sample {
            $( $(#[$field_meta])* pub $field: f64, )+
        }

        impl $sample {
            /// `true` when every field is a finite number.
            pub fn is_finite(&self) -> bool {
                $( self.$field.is_finite() )&&+
            }
        }

        $(#[$batch_meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $batch {
            $( $(#[$field_meta])* pub $field: Array1<f64>, )+
        }

        impl $batch {
            /// Stack per-sample records into one array per field.
            pub fn from_samples(samples: &[$sample]) -> Self {
                Self {
                    $( $field: samples.iter().map(|s| s.$field).collect(), )+
                }
            }

            /// Repeat one record `n` times.
            pub fn uniform(n: usize, sample: $sample) -> Self {
                Self {
                    $( $field: Array1::from_elem(n, sample.$field), )+
                }
            }

            /// The record of sample `i`. Panics if `i` is out of bounds.
            pub fn sample(&self, i: usize) -> $sample {
                $sample {
                    $( $field: self.$field[i], )+
                }
            }

            fn field_lengths(&self) -> Vec<(&'static str, usize)> {
                vec![ $( (stringify!($field), self.$field.len()), )+ ]
            }
        }
    };
}

batch_record! {
    /// Total concentrations of the non-carbonate acid-base systems of one
    /// sample, in mol/kg-sw.
    #[derive(Default)]
    sample SampleTotals;
    /// Batch of totals, one array element per sample.
    batch Totals {
        /// Total borate.
        tb,
        /// Total phosphate.
        tpo4,
        /// Total silicate.
        tsi,
        /// Total ammonia.
        tnh3,
        /// Total hydrogen sulfide.
        th2s,
        /// Total sulfate.
        tso4,
        /// Total fluoride.
        tf,
    }
}

batch_record! {
    /// Equilibrium constants of one sample, already corrected for
    /// temperature and pressure and expressed on a consistent pH scale.
    /// `kso4` and `kf` are on the Free scale.
    sample SampleConstants;
    /// Batch of equilibrium constants, one array element per sample.
    batch KConstants {
        /// CO2 solubility (mol/kg-sw/atm).
        k0,
        k1,
        k2,
        kb,
        kw,
        kp1,
        kp2,
        kp3,
        ksi,
        knh3,
        kh2s,
        kso4,
        kf,
        /// Multiplier converting [H+] on the working scale to the Free scale.
        ph_factor_to_free,
    }
}

/// Totals and constants for a batch, checked once for consistent lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditions {
    totals: Totals,
    constants: KConstants,
    len: usize,
}

impl Conditions {
    pub fn new(totals: Totals, constants: KConstants) -> Result<Self, SolverError> {
        let len = totals.tb.len();
        for (name, found) in totals
            .field_lengths()
            .into_iter()
            .chain(constants.field_lengths())
        {
            if found != len {
                return Err(SolverError::LengthMismatch {
                    name,
                    expected: len,
                    found,
                });
            }
        }
        Ok(Self {
            totals,
            constants,
            len,
        })
    }

    /// The same totals and constants for every one of `n` samples.
    pub fn uniform(n: usize, totals: SampleTotals, constants: SampleConstants) -> Self {
        Self {
            totals: Totals::uniform(n, totals),
            constants: KConstants::uniform(n, constants),
            len: n,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn constants(&self) -> &KConstants {
        &self.constants
    }

    pub fn sample(&self, i: usize) -> (SampleTotals, SampleConstants) {
        (self.totals.sample(i), self.constants.sample(i))
    }
}

/// The kinds of carbonate-system quantity a caller can supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Alkalinity,
    Dic,
    Ph,
    Fco2,
    Bicarbonate,
    Carbonate,
    AqueousCo2,
}

impl Parameter {
    /// Factor from the user-facing unit (µmol/kg, µatm, or pH units) to the
    /// internal one (mol/kg, atm).
    pub fn to_internal_scale(self) -> f64 {
        match self {
            Parameter::Ph => 1.0,
            _ => 1e-6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Alkalinity => "alkalinity",
            Parameter::Dic => "dic",
            Parameter::Ph => "ph",
            Parameter::Fco2 => "fco2",
            Parameter::Bicarbonate => "bicarbonate",
            Parameter::Carbonate => "carbonate",
            Parameter::AqueousCo2 => "aqueous_co2",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solver configuration; every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub alkalinity_model: AlkalinityModel,
    pub ph_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            alkalinity_model: AlkalinityModel::Legacy,
            ph_tolerance: PH_TOLERANCE,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl SolverOptions {
    pub fn normalized(mut self) -> Self {
        if !(self.ph_tolerance.is_finite() && self.ph_tolerance > 0.0) {
            self.ph_tolerance = PH_TOLERANCE;
        }
        if self.max_iterations == 0 {
            self.max_iterations = MAX_ITERATIONS;
        }
        self
    }
}

/// Every carbonate-system quantity for a solved batch, in mol/kg-sw (fCO2
/// in atm).
#[derive(Clone, Debug, PartialEq)]
pub struct CarbonateSystem {
    pub ph: Array1<f64>,
    pub dic: Array1<f64>,
    pub alkalinity: Array1<f64>,
    pub fco2: Array1<f64>,
    pub bicarbonate: Array1<f64>,
    pub carbonate: Array1<f64>,
    pub aqueous_co2: Array1<f64>,
}

/// A JSON value that is either one number for every sample or one number
/// per sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Default for Column {
    fn default() -> Self {
        Column::Scalar(0.0)
    }
}

impl Column {
    fn series_len(&self) -> Option<usize> {
        match self {
            Column::Scalar(_) => None,
            Column::Series(v) => Some(v.len()),
        }
    }

    /// Expand to `n` elements, multiplying every value by `scale`.
    pub fn broadcast(
        &self,
        name: &'static str,
        n: usize,
        scale: f64,
    ) -> Result<Array1<f64>, SolverError> {
        match self {
            Column::Scalar(v) => Ok(Array1::from_elem(n, v * scale)),
            Column::Series(v) if v.len() == n => Ok(v.iter().map(|x| x * scale).collect()),
            Column::Series(v) => Err(SolverError::LengthMismatch {
                name,
                expected: n,
                found: v.len(),
            }),
        }
    }
}

/// Totals as supplied by a user, in µmol/kg-sw. Missing entries are zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalsInput {
    pub tb: Column,
    pub tpo4: Column,
    pub tsi: Column,
    pub tnh3: Column,
    pub th2s: Column,
    pub tso4: Column,
    pub tf: Column,
}

/// Constants as supplied by a user. When `ph_factor_to_free` is omitted the
/// constants are taken to be on the Total scale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstantsInput {
    pub k0: Column,
    pub k1: Column,
    pub k2: Column,
    pub kb: Column,
    pub kw: Column,
    #[serde(default)]
    pub kp1: Column,
    #[serde(default)]
    pub kp2: Column,
    #[serde(default)]
    pub kp3: Column,
    #[serde(default)]
    pub ksi: Column,
    #[serde(default)]
    pub knh3: Column,
    #[serde(default)]
    pub kh2s: Column,
    pub kso4: Column,
    pub kf: Column,
    #[serde(default)]
    pub ph_factor_to_free: Option<Column>,
}

/// One known pair plus the conditions it was measured under.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemInput {
    pub par1: Column,
    pub par2: Column,
    pub par1_type: Parameter,
    pub par2_type: Parameter,
    #[serde(default)]
    pub totals: TotalsInput,
    pub k_constants: ConstantsInput,
}

impl SystemInput {
    /// Number of samples: the longest series, or one when everything is scalar.
    pub fn batch_len(&self) -> usize {
        let t = &self.totals;
        let k = &self.k_constants;
        [
            &self.par1, &self.par2, &t.tb, &t.tpo4, &t.tsi, &t.tnh3, &t.th2s, &t.tso4, &t.tf,
            &k.k0, &k.k1, &k.k2, &k.kb, &k.kw, &k.kp1, &k.kp2, &k.kp3, &k.ksi, &k.knh3, &k.kh2s,
            &k.kso4, &k.kf,
        ]
        .into_iter()
        .chain(k.ph_factor_to_free.as_ref())
        .filter_map(Column::series_len)
        .max()
        .unwrap_or(1)
    }

    pub fn conditions(&self) -> Result<Conditions, SolverError> {
        let n = self.batch_len();
        let t = &self.totals;
        let totals = Totals {
            tb: t.tb.broadcast("tb", n, 1e-6)?,
            tpo4: t.tpo4.broadcast("tpo4", n, 1e-6)?,
            tsi: t.tsi.broadcast("tsi", n, 1e-6)?,
            tnh3: t.tnh3.broadcast("tnh3", n, 1e-6)?,
            th2s: t.th2s.broadcast("th2s", n, 1e-6)?,
            tso4: t.tso4.broadcast("tso4", n, 1e-6)?,
            tf: t.tf.broadcast("tf", n, 1e-6)?,
        };
        let k = &self.k_constants;
        let kso4 = k.kso4.broadcast("kso4", n, 1.0)?;
        let ph_factor_to_free = match &k.ph_factor_to_free {
            Some(col) => col.broadcast("ph_factor_to_free", n, 1.0)?,
            None => totals
                .tso4
                .iter()
                .zip(kso4.iter())
                .map(|(&tso4, &kso4)| 1.0 / free_to_total(tso4, kso4))
                .collect(),
        };
        let constants = KConstants {
            k0: k.k0.broadcast("k0", n, 1.0)?,
            k1: k.k1.broadcast("k1", n, 1.0)?,
            k2: k.k2.broadcast("k2", n, 1.0)?,
            kb: k.kb.broadcast("kb", n, 1.0)?,
            kw: k.kw.broadcast("kw", n, 1.0)?,
            kp1: k.kp1.broadcast("kp1", n, 1.0)?,
            kp2: k.kp2.broadcast("kp2", n, 1.0)?,
            kp3: k.kp3.broadcast("kp3", n, 1.0)?,
            ksi: k.ksi.broadcast("ksi", n, 1.0)?,
            knh3: k.knh3.broadcast("knh3", n, 1.0)?,
            kh2s: k.kh2s.broadcast("kh2s", n, 1.0)?,
            kso4,
            kf: k.kf.broadcast("kf", n, 1.0)?,
            ph_factor_to_free,
        };
        Conditions::new(totals, constants)
    }

    /// The two known quantities in internal units.
    pub fn known(&self) -> Result<(Array1<f64>, Array1<f64>), SolverError> {
        let n = self.batch_len();
        Ok((
            self.par1
                .broadcast("par1", n, self.par1_type.to_internal_scale())?,
            self.par2
                .broadcast("par2", n, self.par2_type.to_internal_scale())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> SampleConstants {
        SampleConstants {
            k0: 0.028,
            k1: 1.4e-6,
            k2: 1.1e-9,
            kb: 2.5e-9,
            kw: 6e-14,
            kp1: 0.024,
            kp2: 1.1e-6,
            kp3: 1.6e-9,
            ksi: 4.1e-10,
            knh3: 5.6e-10,
            kh2s: 1.05e-7,
            kso4: 0.1,
            kf: 2.4e-3,
            ph_factor_to_free: 0.78,
        }
    }

    #[test]
    fn conditions_reject_mismatched_field() {
        let totals = Totals::uniform(3, SampleTotals::default());
        let mut ks = KConstants::uniform(3, constants());
        ks.kw = Array1::from_elem(2, 6e-14);
        let err = Conditions::new(totals, ks).unwrap_err();
        assert_eq!(
            err,
            SolverError::LengthMismatch {
                name: "kw",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn from_samples_round_trips_each_record() {
        let a = SampleTotals {
            tb: 4.16e-4,
            ..Default::default()
        };
        let b = SampleTotals {
            tb: 4.0e-4,
            tso4: 0.028,
            ..Default::default()
        };
        let totals = Totals::from_samples(&[a, b]);
        assert_eq!(totals.sample(0), a);
        assert_eq!(totals.sample(1), b);
    }

    #[test]
    fn column_broadcast_scales_and_checks_length() {
        let c = Column::Scalar(2.0);
        assert_eq!(c.broadcast("x", 3, 0.5).unwrap().to_vec(), vec![1.0; 3]);
        let s = Column::Series(vec![1.0, 2.0]);
        assert!(matches!(
            s.broadcast("x", 3, 1.0),
            Err(SolverError::LengthMismatch { found: 2, .. })
        ));
    }

    #[test]
    fn options_normalize_bad_values() {
        let o = SolverOptions {
            ph_tolerance: -1.0,
            max_iterations: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(o, SolverOptions::default());
    }
}
