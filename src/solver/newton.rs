//! Damped Newton-Raphson iteration for pH from alkalinity and one partner.
//!
//! The same state machine serves all four partner variables; only the
//! initial-guess and step functions change. Every element carries an
//! explicit [`ElementStatus`]. Elements with non-finite inputs are marked
//! [`ElementStatus::Invalid`] before the first iteration and never enter the
//! convergence check. Converged elements are frozen while the rest of the
//! batch keeps iterating.

use log::debug;
use ndarray::Array1;

use crate::error::SolverError;
use crate::models::{Conditions, SampleConstants, SampleTotals, SolverOptions};

/// Steps larger than this are replaced by a unit step.
const STEP_LARGE: f64 = 5.0;
/// Steps larger than this (up to `STEP_LARGE`) are replaced by a half step.
const STEP_MEDIUM: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl From<&SolverOptions> for NewtonSettings {
    fn from(options: &SolverOptions) -> Self {
        Self {
            tolerance: options.ph_tolerance,
            max_iterations: options.max_iterations,
        }
    }
}

impl Default for NewtonSettings {
    fn default() -> Self {
        (&SolverOptions::default()).into()
    }
}

/// Per-element state of the iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementStatus {
    InProgress,
    Converged,
    /// An input was NaN or infinite.
    Invalid,
    /// The initial guess or a step was not finite.
    Diverged,
    /// Still in progress when the iteration cap was reached.
    Unconverged,
}

/// Clip a raw Newton step: beyond 5 pH units take a unit step, beyond 0.5
/// take a half step, otherwise keep it.
pub fn damp_step(delta: f64) -> f64 {
    let magnitude = delta.abs();
    if magnitude > STEP_LARGE {
        delta.signum()
    } else if magnitude > STEP_MEDIUM {
        0.5 * delta.signum()
    } else {
        delta
    }
}

/// Result of one batch solve.
#[derive(Clone, Debug, PartialEq)]
pub struct PhSolution {
    /// Last pH estimate of every element. NaN for `Invalid` and `Diverged`.
    pub ph: Array1<f64>,
    pub status: Vec<ElementStatus>,
    pub iterations: usize,
}

impl PhSolution {
    pub fn count(&self, status: ElementStatus) -> usize {
        self.status.iter().filter(|&&s| s == status).count()
    }

    /// Number of elements that neither converged nor were invalid on input.
    pub fn failed(&self) -> usize {
        self.count(ElementStatus::Diverged) + self.count(ElementStatus::Unconverged)
    }

    /// pH with NaN at every element that did not converge.
    pub fn into_values(self) -> Array1<f64> {
        let Self { mut ph, status, .. } = self;
        for (value, status) in ph.iter_mut().zip(status) {
            if status != ElementStatus::Converged {
                *value = f64::NAN;
            }
        }
        ph
    }

    /// Like [`PhSolution::into_values`], but an element stopped by the
    /// iteration cap is an error.
    pub fn into_result(self) -> Result<Array1<f64>, SolverError> {
        let unconverged = self.count(ElementStatus::Unconverged);
        if unconverged > 0 {
            return Err(SolverError::NonConvergence {
                unconverged,
                iterations: self.iterations,
            });
        }
        Ok(self.into_values())
    }
}

/// Solve for pH given alkalinity and one partner variable.
///
/// `initial(ta, partner, totals, constants)` gives the first guess and
/// `delta(ph, ta, partner, totals, constants)` the raw Newton step.
pub fn solve_ph<I, D>(
    ta: &Array1<f64>,
    partner: &Array1<f64>,
    conditions: &Conditions,
    settings: &NewtonSettings,
    initial: I,
    delta: D,
) -> Result<PhSolution, SolverError>
where
    I: Fn(f64, f64, &SampleTotals, &SampleConstants) -> f64,
    D: Fn(f64, f64, f64, &SampleTotals, &SampleConstants) -> f64,
{
    let n = conditions.len();
    for (name, values) in [("ta", ta), ("partner", partner)] {
        if values.len() != n {
            return Err(SolverError::LengthMismatch {
                name,
                expected: n,
                found: values.len(),
            });
        }
    }

    let samples: Vec<(SampleTotals, SampleConstants)> =
        (0..n).map(|i| conditions.sample(i)).collect();
    let mut status = Vec::with_capacity(n);
    let mut ph = Array1::from_elem(n, f64::NAN);
    for (i, (t, k)) in samples.iter().enumerate() {
        if !(ta[i].is_finite() && partner[i].is_finite() && t.is_finite() && k.is_finite()) {
            status.push(ElementStatus::Invalid);
            continue;
        }
        let guess = initial(ta[i], partner[i], t, k);
        if guess.is_finite() {
            ph[i] = guess;
            status.push(ElementStatus::InProgress);
        } else {
            status.push(ElementStatus::Diverged);
        }
    }

    let mut iterations = 0;
    while status.contains(&ElementStatus::InProgress) {
        if iterations == settings.max_iterations {
            for s in status.iter_mut().filter(|s| **s == ElementStatus::InProgress) {
                *s = ElementStatus::Unconverged;
            }
            break;
        }
        iterations += 1;
        for (i, (t, k)) in samples.iter().enumerate() {
            if status[i] != ElementStatus::InProgress {
                continue;
            }
            let step = damp_step(delta(ph[i], ta[i], partner[i], t, k));
            if !step.is_finite() {
                ph[i] = f64::NAN;
                status[i] = ElementStatus::Diverged;
                continue;
            }
            ph[i] += step;
            if step.abs() < settings.tolerance {
                status[i] = ElementStatus::Converged;
            }
        }
    }

    debug!("pH solver stopped after {iterations} iteration(s) for {n} sample(s)");
    Ok(PhSolution {
        ph,
        status,
        iterations,
    })
}
