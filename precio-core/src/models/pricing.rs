use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Period;

/// Input for one forward price calculation.
///
/// Built per calculation and never persisted. Range checks (`base_cost >= 0`,
/// `profit_percentage` within `[0, 200]`) happen inside the solver so invalid
/// requests fail fast with a specific error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRequest {
    /// Production or acquisition cost of the product or service.
    pub base_cost: Decimal,

    /// Net profit the seller wants to keep, as a percentage of `base_cost`.
    pub profit_percentage: Decimal,

    /// Payment period selecting the ISR tariff.
    pub period: Period,
}

impl PricingRequest {
    pub fn new(
        base_cost: Decimal,
        profit_percentage: Decimal,
        period: Period,
    ) -> Self {
        Self {
            base_cost,
            profit_percentage,
            period,
        }
    }
}

/// The full price breakdown produced by the forward solver.
///
/// All amounts are rounded to two decimals. Invariants:
/// `final_price = pre_tax_subtotal + value_added_tax`, and `net_profit` is
/// the profit the seller asked for, not the ISR-adjusted markup (the
/// adjustment absorbs the tax; the requested profit is what the seller
/// keeps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Price to charge the customer, IVA included.
    pub final_price: Decimal,

    /// Cost plus ISR-adjusted profit, before IVA.
    pub pre_tax_subtotal: Decimal,

    /// Flat IVA charged on the subtotal.
    pub value_added_tax: Decimal,

    /// ISR owed on the subtotal under the period's tariff.
    pub income_tax: Decimal,

    /// The seller's requested profit, kept intact after tax.
    pub net_profit: Decimal,
}

/// Outcome of an inverse solve: the base cost whose forward price lands on
/// (or nearest to) a target final price.
///
/// Best-effort by contract: when the iteration cap runs out before the
/// tolerance is met, the last estimate is still returned and `converged` is
/// `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSolution {
    /// Estimated base cost.
    pub base_cost: Decimal,

    /// Final price the forward solver produces at `base_cost`.
    pub final_price: Decimal,

    /// Forward solves spent reaching the estimate.
    pub iterations: u32,

    /// Whether `final_price` is within tolerance of the target.
    pub converged: bool,
}
