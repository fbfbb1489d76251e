//! Pricing calculations: ISR bracket evaluation, the forward fixed-point
//! price solver, and the inverse (target price to base cost) solver.

pub mod bracket_tax;
pub mod common;
pub mod cost_solver;
pub mod price_solver;

pub use bracket_tax::{BracketTaxError, BracketTaxEvaluator};
pub use cost_solver::{CostSolver, CostSolverConfig};
pub use price_solver::{PriceSolver, PriceSolverError, SolverConfig};
