//! Shared helpers for money arithmetic.

use rust_decimal::Decimal;

/// Rounds to two decimals, half away from zero.
///
/// Every reported amount goes through this: tariffs, prices and taxes are
/// centavo-denominated.
///
/// ```
/// use rust_decimal_macros::dec;
/// use precio_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1086.345)), dec!(1086.35));
/// assert_eq!(round_half_up(dec!(1086.344)), dec!(1086.34));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
