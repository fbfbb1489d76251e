//! Forward pricing: from base cost and target profit to the final price.
//!
//! The seller wants to keep `base_cost * profit_percentage / 100` after ISR.
//! ISR is assessed on the pre-IVA subtotal (cost plus tax-inclusive markup),
//! and the markup needed to cover the tax depends on the tax itself, so the
//! two are mutually recursive. The solver iterates the adjustment to a fixed
//! point: within one bracket the update is an affine contraction (marginal
//! rates stay below 100%), so a handful of rounds settles to the centavo. A
//! bracket boundary crossed mid-iteration can oscillate; the iteration cap
//! bounds that case and the result is then a ±tolerance approximation, which
//! is the documented contract rather than an error.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use precio_core::{
//!     Bracket, BracketTable, Period, PriceSolver, PricingRequest, SolverConfig, TaxSchedule,
//! };
//!
//! let table = || BracketTable::new(vec![
//!     Bracket {
//!         lower_bound: dec!(0),
//!         upper_bound: Some(dec!(746.04)),
//!         base_quota: dec!(0),
//!         rate_over_excess: dec!(1.92),
//!     },
//!     Bracket {
//!         lower_bound: dec!(746.05),
//!         upper_bound: None,
//!         base_quota: dec!(14.32),
//!         rate_over_excess: dec!(6.40),
//!     },
//! ]).unwrap();
//! let schedule = TaxSchedule::new(table(), table(), table(), table(), table());
//!
//! let solver = PriceSolver::new(&schedule, SolverConfig::new(dec!(0.16)));
//! let result = solver
//!     .solve(&PricingRequest::new(dec!(700.00), dec!(30), Period::Mensual))
//!     .unwrap();
//!
//! assert_eq!(result.net_profit, dec!(210.00));
//! assert_eq!(result.final_price, result.pre_tax_subtotal + result.value_added_tax);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::bracket_tax::{BracketTaxError, BracketTaxEvaluator};
use crate::calculations::common::round_half_up;
use crate::models::{PricingRequest, PricingResult, TaxSchedule};

/// Errors from the forward and inverse price solvers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceSolverError {
    /// Base cost must be non-negative.
    #[error("base cost must be non-negative, got {0}")]
    NegativeBaseCost(Decimal),

    /// Profit percentage must lie within [0, 200].
    #[error("profit percentage must be within [0, 200], got {0}")]
    ProfitPercentageOutOfRange(Decimal),

    /// The flat IVA rate must lie within [0, 1).
    #[error("IVA rate must be within [0, 1), got {0}")]
    InvalidVatRate(Decimal),

    /// The convergence tolerance must be positive.
    #[error("convergence tolerance must be positive, got {0}")]
    InvalidTolerance(Decimal),

    /// At least one iteration is required.
    #[error("iteration cap must be at least 1, got {0}")]
    InvalidIterationCap(u32),

    /// Inverse mode needs a positive target price.
    #[error("target price must be positive, got {0}")]
    NonPositiveTargetPrice(Decimal),

    /// Inverse-mode seed divisor (the assumed price-to-subtotal factor) must
    /// be positive.
    #[error("seed VAT divisor must be positive, got {0}")]
    InvalidSeedVatDivisor(Decimal),

    /// Inverse-mode seed share (the assumed cost share of the subtotal) must
    /// lie within (0, 1].
    #[error("seed cost share must be within (0, 1], got {0}")]
    InvalidSeedCostShare(Decimal),

    /// Inverse-mode damping divisor must be positive.
    #[error("step divisor must be positive, got {0}")]
    InvalidStepDivisor(Decimal),

    /// Tariff evaluation failed (malformed table or negative intermediate).
    #[error(transparent)]
    Tax(#[from] BracketTaxError),
}

/// Highest accepted profit percentage.
fn max_profit_percentage() -> Decimal {
    Decimal::from(200)
}

/// Parameters of the forward solve.
///
/// Reference values: 16% IVA, one-centavo tolerance, ten rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Flat IVA rate applied to the pre-tax subtotal, as a fraction.
    pub vat_rate: Decimal,

    /// Stop once successive profit adjustments differ by less than this.
    pub tolerance: Decimal,

    /// Iteration cap bounding bracket-boundary oscillation.
    pub max_iterations: u32,
}

impl SolverConfig {
    /// Config with the reference tolerance (0.01) and cap (10).
    pub fn new(vat_rate: Decimal) -> Self {
        Self {
            vat_rate,
            tolerance: Decimal::new(1, 2),
            max_iterations: 10,
        }
    }

    /// # Errors
    ///
    /// Returns [`PriceSolverError`] if the IVA rate is outside [0, 1), the
    /// tolerance is not positive, or the iteration cap is zero.
    pub fn validate(&self) -> Result<(), PriceSolverError> {
        if self.vat_rate < Decimal::ZERO || self.vat_rate >= Decimal::ONE {
            return Err(PriceSolverError::InvalidVatRate(self.vat_rate));
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

/// The forward price solver.
///
/// Borrows the tariff schedule; carries no other state, so a single instance
/// serves any number of requests and identical requests always produce
/// identical results.
#[derive(Debug, Clone, Copy)]
pub struct PriceSolver<'a> {
    schedule: &'a TaxSchedule,
    config: SolverConfig,
}

impl<'a> PriceSolver<'a> {
    pub fn new(
        schedule: &'a TaxSchedule,
        config: SolverConfig,
    ) -> Self {
        Self { schedule, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the full forward solve.
    ///
    /// # Errors
    ///
    /// Returns [`PriceSolverError`] on invalid config, a negative base cost,
    /// a profit percentage outside [0, 200], or a tariff evaluation failure.
    pub fn solve(
        &self,
        request: &PricingRequest,
    ) -> Result<PricingResult, PriceSolverError> {
        self.config.validate()?;
        validate_request(request)?;

        let evaluator = BracketTaxEvaluator::new(self.schedule);
        let desired_profit = round_half_up(
            request.base_cost * request.profit_percentage / Decimal::ONE_HUNDRED,
        );

        let adjusted_profit =
            self.converge_adjusted_profit(&evaluator, request, desired_profit)?;

        let pre_tax_subtotal = round_half_up(request.base_cost + adjusted_profit);
        // The loop's last tax can be one iteration stale; the reported ISR is
        // recomputed on the final subtotal.
        let income_tax = evaluator.evaluate(pre_tax_subtotal, request.period)?;
        let value_added_tax = round_half_up(pre_tax_subtotal * self.config.vat_rate);
        let final_price = pre_tax_subtotal + value_added_tax;

        Ok(PricingResult {
            final_price,
            pre_tax_subtotal,
            value_added_tax,
            income_tax,
            net_profit: desired_profit,
        })
    }

    /// Iterates `adjusted = desired + tax(cost + adjusted)` to its fixed
    /// point. On cap exhaustion the last iterate is returned and a warning
    /// logged; the caller still gets a usable, tolerance-bounded figure.
    fn converge_adjusted_profit(
        &self,
        evaluator: &BracketTaxEvaluator<'_>,
        request: &PricingRequest,
        desired_profit: Decimal,
    ) -> Result<Decimal, PriceSolverError> {
        let mut adjusted_profit = desired_profit;

        for iteration in 1..=self.config.max_iterations {
            let candidate_subtotal = request.base_cost + adjusted_profit;
            let tax = evaluator.evaluate(candidate_subtotal, request.period)?;
            let next = desired_profit + tax;
            let step = (next - adjusted_profit).abs();
            adjusted_profit = next;

            if step < self.config.tolerance {
                debug!(
                    iteration,
                    adjusted_profit = %adjusted_profit,
                    "profit adjustment converged"
                );
                return Ok(adjusted_profit);
            }
        }

        warn!(
            cap = self.config.max_iterations,
            adjusted_profit = %adjusted_profit,
            "profit adjustment still moving at the iteration cap; using last iterate"
        );
        Ok(adjusted_profit)
    }
}

fn validate_request(request: &PricingRequest) -> Result<(), PriceSolverError> {
    if request.base_cost < Decimal::ZERO {
        return Err(PriceSolverError::NegativeBaseCost(request.base_cost));
    }
    if request.profit_percentage < Decimal::ZERO
        || request.profit_percentage > max_profit_percentage()
    {
        return Err(PriceSolverError::ProfitPercentageOutOfRange(
            request.profit_percentage,
        ));
    }
    Ok(())
}
