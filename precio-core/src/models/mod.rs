mod bracket;
mod period;
mod pricing;
mod schedule;

pub use bracket::{Bracket, BracketTable, BracketTableError};
pub use period::Period;
pub use pricing::{CostSolution, PricingRequest, PricingResult};
pub use schedule::TaxSchedule;
