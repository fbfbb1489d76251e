pub mod calculations;
pub mod models;

pub use calculations::{
    BracketTaxError, BracketTaxEvaluator, CostSolver, CostSolverConfig, PriceSolver,
    PriceSolverError, SolverConfig,
};
pub use models::*;
