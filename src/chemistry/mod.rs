//! Chemistry module: the equilibrium relations of the seawater carbonate system.
//!
//! This module provides:
//! - Pairwise relations between DIC, pH, fCO2, bicarbonate and carbonate
//!   derived from DIC speciation (`relations`)
//! - The alkalinity definition and its individual contributions, including the
//!   non-carbonate acid-base systems and their derivative in [H+] (`alkalinity`)
//!
//! Units conventions:
//! - Concentrations are mol/kg-sw
//! - fCO2 is atm, so `k0` is mol/kg-sw/atm
//! - [H+] is mol/kg-sw on whatever pH scale the constants are expressed on;
//!   `kso4` and `kf` are always on the Free scale
//!
//! Design notes:
//! - Every function here is a scalar kernel over one sample. Batch versions
//!   live on [`crate::solver::CarbonateSolver`]
//! - Nothing is clamped: degenerate inputs (e.g. H = 0) give inf or NaN, which
//!   callers propagate elementwise
//! - All relations derive from the same two governing equations (DIC
//!   speciation and the alkalinity definition) and must stay mutually
//!   consistent
//!
//! # Examples
//! ```rust
//! use carbonate_rs::chemistry::relations::{carb_from_tc_ph, hco3_from_tc_ph, tc_from_ph_carb};
//! use carbonate_rs::models::SampleConstants;
//!
//! let k = SampleConstants {
//!     k0: 0.0284, k1: 1.42e-6, k2: 1.12e-9, kb: 2.53e-9, kw: 6.0e-14,
//!     kp1: 0.0244, kp2: 1.08e-6, kp3: 1.62e-9, ksi: 4.1e-10, knh3: 5.6e-10,
//!     kh2s: 1.05e-7, kso4: 0.102, kf: 2.4e-3, ph_factor_to_free: 0.783,
//! };
//! let co3 = carb_from_tc_ph(2000e-6, 8.0, &k);
//! assert!(co3 > 0.0 && hco3_from_tc_ph(2000e-6, 8.0, &k) > co3);
//! assert!((tc_from_ph_carb(8.0, co3, &k) - 2000e-6).abs() < 1e-15);
//! ```

pub mod alkalinity;
pub mod relations;

/// Tolerance on the Newton step (pH units) below which an element counts as converged.
pub const PH_TOLERANCE: f64 = 1e-8;
/// Default cap on Newton-Raphson iterations per solve.
pub const MAX_ITERATIONS: usize = 100;

/// [H+] from pH.
pub fn h_from_ph(ph: f64) -> f64 {
    10f64.powf(-ph)
}

/// pH from [H+].
pub fn ph_from_h(h: f64) -> f64 {
    -h.log10()
}
