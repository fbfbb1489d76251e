//! Inverse pricing: from a target final price back to the base cost.
//!
//! Runs the forward solver under a damped correction loop. The seed assumes
//! the reference 16% IVA and a markup near 40% of the subtotal; each round
//! corrects the cost by the price error divided by an approximate combined
//! tax-plus-IVA multiplier. Both constants are empirical heuristics, kept as
//! named, tunable config rather than literals in the loop.
//!
//! The contract is best-effort: if the cap runs out before the price error
//! drops under the tolerance, the closest estimate seen is returned with
//! `converged: false` rather than an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::round_half_up;
use crate::calculations::price_solver::{PriceSolver, PriceSolverError};
use crate::models::{CostSolution, Period, PricingRequest};

/// Parameters of the inverse solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSolverConfig {
    /// Assumed price-to-subtotal factor for the seed (1 + IVA rate).
    pub seed_vat_divisor: Decimal,

    /// Assumed cost share of the subtotal for the seed.
    pub seed_cost_share: Decimal,

    /// Damping divisor for the per-round cost correction; approximates the
    /// combined ISR-plus-IVA price multiplier.
    pub step_divisor: Decimal,

    /// Acceptable distance between the achieved and target final price.
    pub tolerance: Decimal,

    /// Forward solves to spend before settling for the best estimate.
    pub max_iterations: u32,
}

impl Default for CostSolverConfig {
    /// The reference heuristics: seed at `target / 1.16 * 0.60`, corrections
    /// damped by 2.16, one currency unit of tolerance, twenty rounds.
    fn default() -> Self {
        Self {
            seed_vat_divisor: Decimal::new(116, 2),
            seed_cost_share: Decimal::new(60, 2),
            step_divisor: Decimal::new(216, 2),
            tolerance: Decimal::ONE,
            max_iterations: 20,
        }
    }
}

impl CostSolverConfig {
    /// # Errors
    ///
    /// Returns [`PriceSolverError`] if a divisor is not positive, the seed
    /// cost share is outside (0, 1], the tolerance is not positive, or the
    /// iteration cap is zero.
    pub fn validate(&self) -> Result<(), PriceSolverError> {
        if self.seed_vat_divisor <= Decimal::ZERO {
            return Err(PriceSolverError::InvalidSeedVatDivisor(
                self.seed_vat_divisor,
            ));
        }
        if self.seed_cost_share <= Decimal::ZERO || self.seed_cost_share > Decimal::ONE {
            return Err(PriceSolverError::InvalidSeedCostShare(self.seed_cost_share));
        }
        if self.step_divisor <= Decimal::ZERO {
            return Err(PriceSolverError::InvalidStepDivisor(self.step_divisor));
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(PriceSolverError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(PriceSolverError::InvalidIterationCap(self.max_iterations));
        }
        Ok(())
    }
}

/// The inverse solver: finds the base cost whose forward price meets a
/// target.
#[derive(Debug, Clone, Copy)]
pub struct CostSolver<'a> {
    forward: PriceSolver<'a>,
    config: CostSolverConfig,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    base_cost: Decimal,
    final_price: Decimal,
    error: Decimal,
}

impl<'a> CostSolver<'a> {
    pub fn new(
        forward: PriceSolver<'a>,
        config: CostSolverConfig,
    ) -> Self {
        Self { forward, config }
    }

    /// Finds a base cost such that the forward price at that cost lands
    /// within tolerance of `target_price`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceSolverError`] on invalid config, a non-positive target,
    /// or when the forward solver rejects its inputs. Running out of
    /// iterations is NOT an error: the best candidate is returned with
    /// `converged: false`.
    pub fn solve_for_cost(
        &self,
        target_price: Decimal,
        profit_percentage: Decimal,
        period: Period,
    ) -> Result<CostSolution, PriceSolverError> {
        self.config.validate()?;
        if target_price <= Decimal::ZERO {
            return Err(PriceSolverError::NonPositiveTargetPrice(target_price));
        }

        let mut base_cost = round_half_up(
            target_price / self.config.seed_vat_divisor * self.config.seed_cost_share,
        );
        let mut best = Candidate {
            base_cost,
            final_price: Decimal::ZERO,
            error: Decimal::MAX,
        };

        for iteration in 1..=self.config.max_iterations {
            let request = PricingRequest::new(base_cost, profit_percentage, period);
            let result = self.forward.solve(&request)?;

            let error = target_price - result.final_price;
            let candidate = Candidate {
                base_cost,
                final_price: result.final_price,
                error: error.abs(),
            };
            if candidate.error < best.error {
                best = candidate;
            }

            if candidate.error < self.config.tolerance {
                debug!(
                    iteration,
                    base_cost = %base_cost,
                    final_price = %result.final_price,
                    "inverse solve converged"
                );
                return Ok(CostSolution {
                    base_cost,
                    final_price: result.final_price,
                    iterations: iteration,
                    converged: true,
                });
            }

            let corrected = base_cost + error / self.config.step_divisor;
            base_cost = round_half_up(corrected.max(Decimal::ZERO));
        }

        // Cap exhausted; the candidate closest to the target still stands.
        warn!(
            cap = self.config.max_iterations,
            base_cost = %best.base_cost,
            price_error = %best.error,
            "inverse solve hit the iteration cap; returning best estimate"
        );
        Ok(CostSolution {
            base_cost: best.base_cost,
            final_price: best.final_price,
            iterations: self.config.max_iterations,
            converged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::calculations::price_solver::SolverConfig;
    use crate::models::{Bracket, BracketTable, TaxSchedule};

    use super::*;

    fn test_table() -> BracketTable {
        BracketTable::new(vec![
            Bracket {
                lower_bound: dec!(0),
                upper_bound: Some(dec!(746.04)),
                base_quota: dec!(0),
                rate_over_excess: dec!(1.92),
            },
            Bracket {
                lower_bound: dec!(746.05),
                upper_bound: Some(dec!(6332.05)),
                base_quota: dec!(14.32),
                rate_over_excess: dec!(6.40),
            },
            Bracket {
                lower_bound: dec!(6332.06),
                upper_bound: None,
                base_quota: dec!(371.82),
                rate_over_excess: dec!(10.88),
            },
        ])
        .unwrap()
    }

    fn test_schedule() -> TaxSchedule {
        TaxSchedule::new(
            test_table(),
            test_table(),
            test_table(),
            test_table(),
            test_table(),
        )
    }

    #[test]
    fn validate_rejects_zero_step_divisor() {
        let config = CostSolverConfig {
            step_divisor: dec!(0),
            ..CostSolverConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(PriceSolverError::InvalidStepDivisor(dec!(0)))
        );
    }

    #[test]
    fn validate_rejects_seed_cost_share_above_one() {
        let config = CostSolverConfig {
            seed_cost_share: dec!(1.5),
            ..CostSolverConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(PriceSolverError::InvalidSeedCostShare(dec!(1.5)))
        );
    }

    #[test]
    fn solve_for_cost_rejects_non_positive_target() {
        let schedule = test_schedule();
        let forward = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
        let solver = CostSolver::new(forward, CostSolverConfig::default());

        let result = solver.solve_for_cost(dec!(0), dec!(30), Period::Mensual);

        assert_eq!(
            result,
            Err(PriceSolverError::NonPositiveTargetPrice(dec!(0)))
        );
    }

    #[test]
    fn solve_for_cost_recovers_known_forward_price() {
        let schedule = test_schedule();
        let forward = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
        let known = forward
            .solve(&PricingRequest::new(dec!(700.00), dec!(30), Period::Mensual))
            .unwrap();

        let solver = CostSolver::new(forward, CostSolverConfig::default());
        let solution = solver
            .solve_for_cost(known.final_price, dec!(30), Period::Mensual)
            .unwrap();

        assert!(solution.converged);
        assert!(
            (solution.base_cost - dec!(700.00)).abs() <= dec!(1),
            "recovered cost {} too far from 700",
            solution.base_cost
        );
        assert!((solution.final_price - known.final_price).abs() < dec!(1));
    }

    #[test]
    fn solve_for_cost_achieved_price_matches_forward_solve_at_estimate() {
        let schedule = test_schedule();
        let forward = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
        let solver = CostSolver::new(forward, CostSolverConfig::default());

        let solution = solver
            .solve_for_cost(dec!(1000.00), dec!(25), Period::Mensual)
            .unwrap();

        let replay = forward
            .solve(&PricingRequest::new(
                solution.base_cost,
                dec!(25),
                Period::Mensual,
            ))
            .unwrap();
        assert_eq!(replay.final_price, solution.final_price);
    }

    #[test]
    fn solve_for_cost_returns_best_estimate_when_cap_is_too_small() {
        let schedule = test_schedule();
        let forward = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
        let config = CostSolverConfig {
            max_iterations: 1,
            ..CostSolverConfig::default()
        };
        let solver = CostSolver::new(forward, config);

        let solution = solver
            .solve_for_cost(dec!(1086.35), dec!(30), Period::Mensual)
            .unwrap();

        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
        // The seed is still a usable ballpark figure.
        assert!(solution.base_cost > dec!(0));
    }

    #[test]
    fn solve_for_cost_small_target_converges_to_small_cost() {
        let schedule = test_schedule();
        let forward = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
        let solver = CostSolver::new(forward, CostSolverConfig::default());

        let solution = solver
            .solve_for_cost(dec!(1.00), dec!(0), Period::Diario)
            .unwrap();

        assert!(solution.converged);
        assert!(solution.base_cost < dec!(1.00));
    }
}
