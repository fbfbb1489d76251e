//! Progressive ISR evaluation over a periodic withholding tariff.
//!
//! The SAT tariffs are stepped: each bracket carries a fixed quota (the tax
//! accumulated by all lower brackets) plus a marginal rate on the portion of
//! the amount above the bracket's lower bound. Evaluation is a single scan of
//! the period's table.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use precio_core::{Bracket, BracketTable, BracketTaxEvaluator, Period, TaxSchedule};
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
//!
//! let schedule = TaxSchedule::new(table(), table(), table(), table(), table());
//! let evaluator = BracketTaxEvaluator::new(&schedule);
//!
//! // 14.32 + (910 - 746.05) * 6.40%
//! assert_eq!(evaluator.evaluate(dec!(910.00), Period::Mensual).unwrap(), dec!(24.81));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_half_up;
use crate::models::{Period, TaxSchedule};

/// Errors from ISR evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTaxError {
    /// Tax is only defined for non-negative amounts.
    #[error("cannot evaluate tax on negative amount {0}")]
    NegativeAmount(Decimal),

    /// No bracket covers the amount. Unreachable with a validated table; when
    /// it happens the table is malformed and the caller must hear about it,
    /// not receive a silent zero.
    #[error("no {period} bracket matches amount {amount}")]
    UnmatchedBracket { amount: Decimal, period: Period },
}

/// Evaluates ISR owed on an amount under the tariff for a payment period.
///
/// Pure and deterministic: no state beyond the borrowed schedule.
#[derive(Debug, Clone, Copy)]
pub struct BracketTaxEvaluator<'a> {
    schedule: &'a TaxSchedule,
}

impl<'a> BracketTaxEvaluator<'a> {
    pub fn new(schedule: &'a TaxSchedule) -> Self {
        Self { schedule }
    }

    /// ISR owed on `amount` under the `period` tariff.
    ///
    /// The amount is rounded to the cent grid first; tariff bounds are
    /// centavo-denominated and both bounds are inclusive, so an amount
    /// exactly on an upper bound stays in that bracket.
    ///
    /// # Errors
    ///
    /// [`BracketTaxError::NegativeAmount`] for negative input, and
    /// [`BracketTaxError::UnmatchedBracket`] if the table has a gap (a
    /// malformed table that slipped past validation).
    pub fn evaluate(
        &self,
        amount: Decimal,
        period: Period,
    ) -> Result<Decimal, BracketTaxError> {
        if amount < Decimal::ZERO {
            return Err(BracketTaxError::NegativeAmount(amount));
        }

        let amount = round_half_up(amount);
        let bracket = self
            .schedule
            .table(period)
            .find(amount)
            .ok_or(BracketTaxError::UnmatchedBracket { amount, period })?;

        let excess = amount - bracket.lower_bound;
        let tax = bracket.base_quota + excess * bracket.rate_over_excess / Decimal::ONE_HUNDRED;

        Ok(round_half_up(tax))
    }
}
