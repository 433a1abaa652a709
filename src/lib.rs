pub mod adapters;
pub mod chemistry;
pub mod error;
pub mod models;
pub mod solver;

pub use crate::chemistry::alkalinity::{AlkalinityModel, AlkalinityParts, PhosphateSpecies};
pub use crate::error::{AppError, SolverError};
pub use crate::models::{
    CarbonateSystem, Conditions, KConstants, Parameter, SampleConstants, SampleTotals,
    SolverOptions, SystemInput, Totals,
};
pub use crate::solver::newton::{ElementStatus, PhSolution};
pub use crate::solver::system::solve_system;
pub use crate::solver::{AlkalinityBreakdown, CarbonateSolver};
