use thiserror::Error;

use crate::models::Parameter;

/// Structural failures of a solver call.
///
/// Chemically impossible samples are not errors: they come back as NaN at
/// the affected elements while the rest of the batch is computed normally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Length mismatch for '{name}': expected {expected} samples, found {found}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("pH solver did not converge for {unconverged} sample(s) within {iterations} iterations")]
    NonConvergence { unconverged: usize, iterations: usize },

    #[error("Unsupported input pair: {0} and {1}")]
    UnsupportedPair(Parameter, Parameter),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[cfg(feature = "cli")]
    #[error("Error reading from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --inputs-json: {source}")]
    ParseInputsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --options-json: {source}")]
    ParseOptionsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON in input document: {source}")]
    ParseCmdInputJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Could not serialize output to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },

    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),

    #[cfg(feature = "cli")]
    #[error("Missing input data: provide --input or --inputs-json")]
    MissingInputData,
}
