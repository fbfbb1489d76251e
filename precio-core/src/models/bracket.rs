use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One row of an ISR withholding tariff.
///
/// Bounds are inclusive on both ends; the final bracket of a table has
/// `upper_bound: None` and covers everything above its lower bound.
/// `base_quota` is the fixed tax accumulated by all lower brackets, and
/// `rate_over_excess` is the percentage applied to the portion of the amount
/// above `lower_bound` ("% sobre excedente del límite inferior").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub base_quota: Decimal,
    pub rate_over_excess: Decimal,
}

/// Errors raised when constructing a [`BracketTable`] from raw rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    /// The table has no brackets at all.
    #[error("tariff table has no brackets")]
    Empty,

    /// The first bracket must start at exactly zero so a zero amount matches.
    #[error("first bracket must start at 0, got {0}")]
    FirstLowerBoundNotZero(Decimal),

    /// Only the final bracket may be unbounded.
    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeLast { index: usize },

    /// A bracket's upper bound is below its lower bound.
    #[error("bracket {index} has upper bound {upper} below lower bound {lower}")]
    InvertedBounds {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    /// Brackets must be contiguous on the cent grid: each lower bound is the
    /// previous upper bound plus one centavo.
    #[error("bracket {index} starts at {lower}, expected {expected} (one centavo above the previous bracket)")]
    NotContiguous {
        index: usize,
        lower: Decimal,
        expected: Decimal,
    },

    /// Marginal rates are percentages and must lie in [0, 100).
    #[error("bracket {index} has rate {rate}%, outside [0, 100)")]
    InvalidRate { index: usize, rate: Decimal },

    /// Base quotas are cumulative tax amounts and cannot be negative.
    #[error("bracket {index} has negative base quota {quota}")]
    NegativeQuota { index: usize, quota: Decimal },

    /// Base quotas accumulate across brackets and cannot decrease.
    #[error("bracket {index} has base quota {quota} below the previous bracket's {previous}")]
    DecreasingQuota {
        index: usize,
        quota: Decimal,
        previous: Decimal,
    },
}

/// A validated, ordered ISR tariff for one payment period.
///
/// Construction via [`BracketTable::new`] enforces the structural invariants
/// the evaluator relies on: brackets sorted ascending, contiguous on the cent
/// grid, covering `[0, +inf)` with exactly one unbounded final bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

/// Published tariffs round their quotas to the centavo, so the cumulative sum
/// drifts slightly from the printed value. Drift beyond this is worth a log
/// line; it is not a structural failure.
fn quota_drift_warn_threshold() -> Decimal {
    Decimal::new(50, 2)
}

impl BracketTable {
    /// Validates raw tariff rows into a table.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the rows are empty, do not start at
    /// zero, are not cent-contiguous, contain an unbounded row before the
    /// last, or carry rates/quotas outside their valid ranges.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, BracketTableError> {
        if brackets.is_empty() {
            return Err(BracketTableError::Empty);
        }

        let first = &brackets[0];
        if first.lower_bound != Decimal::ZERO {
            return Err(BracketTableError::FirstLowerBoundNotZero(
                first.lower_bound,
            ));
        }

        let cent = Decimal::new(1, 2);
        let last_index = brackets.len() - 1;
        let one_hundred = Decimal::ONE_HUNDRED;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate_over_excess < Decimal::ZERO
                || bracket.rate_over_excess >= one_hundred
            {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.rate_over_excess,
                });
            }
            if bracket.base_quota < Decimal::ZERO {
                return Err(BracketTableError::NegativeQuota {
                    index,
                    quota: bracket.base_quota,
                });
            }

            match bracket.upper_bound {
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeLast { index });
                }
                Some(upper) if upper < bracket.lower_bound => {
                    return Err(BracketTableError::InvertedBounds {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                _ => {}
            }

            if index > 0 {
                let previous = &brackets[index - 1];
                if bracket.base_quota < previous.base_quota {
                    return Err(BracketTableError::DecreasingQuota {
                        index,
                        quota: bracket.base_quota,
                        previous: previous.base_quota,
                    });
                }
                // Contiguity: previous upper is Some(_) here, since an
                // unbounded row anywhere but the end was rejected above.
                if let Some(previous_upper) = previous.upper_bound {
                    let expected = previous_upper + cent;
                    if bracket.lower_bound != expected {
                        return Err(BracketTableError::NotContiguous {
                            index,
                            lower: bracket.lower_bound,
                            expected,
                        });
                    }
                }

                // Quota drift is informational only: published tariffs carry
                // centavo-level rounding in their printed quotas.
                let span = bracket.lower_bound - previous.lower_bound;
                let cumulative =
                    previous.base_quota + span * previous.rate_over_excess / one_hundred;
                let drift = (bracket.base_quota - cumulative).abs();
                if drift > quota_drift_warn_threshold() {
                    warn!(
                        index,
                        quota = %bracket.base_quota,
                        cumulative = %cumulative,
                        "bracket base quota drifts from cumulative tariff sum"
                    );
                }
            }
        }

        Ok(Self { brackets })
    }

    /// The validated rows, ascending by lower bound.
    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Finds the unique bracket covering `amount`, inclusive on both bounds.
    ///
    /// Returns `None` only for negative amounts; a validated table covers
    /// `[0, +inf)` with no gaps.
    pub fn find(
        &self,
        amount: Decimal,
    ) -> Option<&Bracket> {
        self.brackets.iter().find(|bracket| {
            amount >= bracket.lower_bound
                && bracket.upper_bound.is_none_or(|upper| amount <= upper)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        lower: Decimal,
        upper: Option<Decimal>,
        quota: Decimal,
        rate: Decimal,
    ) -> Bracket {
        Bracket {
            lower_bound: lower,
            upper_bound: upper,
            base_quota: quota,
            rate_over_excess: rate,
        }
    }

    fn three_bracket_rows() -> Vec<Bracket> {
        vec![
            bracket(dec!(0), Some(dec!(99.99)), dec!(0), dec!(2)),
            bracket(dec!(100.00), Some(dec!(999.99)), dec!(2.00), dec!(10)),
            bracket(dec!(1000.00), None, dec!(92.00), dec!(30)),
        ]
    }

    #[test]
    fn new_accepts_well_formed_table() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        assert_eq!(table.brackets().len(), 3);
    }

    #[test]
    fn new_rejects_empty_table() {
        let result = BracketTable::new(Vec::new());

        assert_eq!(result, Err(BracketTableError::Empty));
    }

    #[test]
    fn new_rejects_first_bracket_not_starting_at_zero() {
        let mut rows = three_bracket_rows();
        rows[0].lower_bound = dec!(0.01);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::FirstLowerBoundNotZero(dec!(0.01)))
        );
    }

    #[test]
    fn new_rejects_unbounded_bracket_before_last() {
        let mut rows = three_bracket_rows();
        rows[1].upper_bound = None;

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::UnboundedBeforeLast { index: 1 })
        );
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let mut rows = three_bracket_rows();
        rows[1].upper_bound = Some(dec!(50.00));

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::InvertedBounds {
                index: 1,
                lower: dec!(100.00),
                upper: dec!(50.00),
            })
        );
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let mut rows = three_bracket_rows();
        rows[1].lower_bound = dec!(100.02);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::NotContiguous {
                index: 1,
                lower: dec!(100.02),
                expected: dec!(100.00),
            })
        );
    }

    #[test]
    fn new_rejects_overlapping_brackets() {
        let mut rows = three_bracket_rows();
        rows[1].lower_bound = dec!(99.99);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::NotContiguous {
                index: 1,
                lower: dec!(99.99),
                expected: dec!(100.00),
            })
        );
    }

    #[test]
    fn new_rejects_rate_of_one_hundred_or_more() {
        let mut rows = three_bracket_rows();
        rows[2].rate_over_excess = dec!(100);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::InvalidRate {
                index: 2,
                rate: dec!(100),
            })
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let mut rows = three_bracket_rows();
        rows[0].rate_over_excess = dec!(-1);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::InvalidRate {
                index: 0,
                rate: dec!(-1),
            })
        );
    }

    #[test]
    fn new_rejects_negative_quota() {
        let mut rows = three_bracket_rows();
        rows[1].base_quota = dec!(-2.00);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::NegativeQuota {
                index: 1,
                quota: dec!(-2.00),
            })
        );
    }

    #[test]
    fn new_rejects_decreasing_quota() {
        let mut rows = three_bracket_rows();
        rows[2].base_quota = dec!(1.00);

        let result = BracketTable::new(rows);

        assert_eq!(
            result,
            Err(BracketTableError::DecreasingQuota {
                index: 2,
                quota: dec!(1.00),
                previous: dec!(2.00),
            })
        );
    }

    #[test]
    fn find_matches_zero_in_first_bracket() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        let found = table.find(dec!(0)).unwrap();

        assert_eq!(found.lower_bound, dec!(0));
    }

    #[test]
    fn find_uses_inclusive_upper_bound() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        let found = table.find(dec!(99.99)).unwrap();

        assert_eq!(found.lower_bound, dec!(0));
    }

    #[test]
    fn find_moves_to_next_bracket_one_centavo_above_upper() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        let found = table.find(dec!(100.00)).unwrap();

        assert_eq!(found.lower_bound, dec!(100.00));
    }

    #[test]
    fn find_matches_unbounded_final_bracket() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        let found = table.find(dec!(1000000.00)).unwrap();

        assert_eq!(found.upper_bound, None);
    }

    #[test]
    fn find_returns_none_for_negative_amount() {
        let table = BracketTable::new(three_bracket_rows()).unwrap();

        assert_eq!(table.find(dec!(-0.01)), None);
    }
}
