use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{input}'")]
pub struct ParseAmountError {
    input: String,
}

/// Normalizes numeric input: trims whitespace, strips a leading `$` and
/// removes commas (thousands separator).
fn normalize_amount_input(s: &str) -> String {
    s.trim().trim_start_matches('$').replace(',', "")
}

/// Parses a currency or plain numeric amount.
///
/// Accepts `700`, `1,234.56` and `$1,234.56`. Empty input is an error: on
/// the command line there is no meaningful default for an amount.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    normalized.parse().map_err(|_| {
        tracing::debug!(input = %s, "amount did not parse");
        ParseAmountError {
            input: s.to_string(),
        }
    })
}

/// Parses a percentage, tolerating a trailing `%` (`30`, `30%`, `12.5%`).
pub fn parse_percentage(s: &str) -> Result<Decimal, ParseAmountError> {
    parse_amount(s.trim().trim_end_matches('%'))
}

/// Formats an amount as currency: two decimals, comma-grouped thousands,
/// leading `$` (`$1,086.35`).
pub fn format_currency(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{fraction}", group_thousands(integer))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_amount_accepts_plain_numbers() {
        assert_eq!(parse_amount("700"), Ok(dec!(700)));
        assert_eq!(parse_amount("123.45"), Ok(dec!(123.45)));
    }

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("1,234.56"), Ok(dec!(1234.56)));
        assert_eq!(parse_amount("1,234,567.89"), Ok(dec!(1234567.89)));
    }

    #[test]
    fn parse_amount_accepts_currency_sign_and_whitespace() {
        assert_eq!(parse_amount("  $1,086.35  "), Ok(dec!(1086.35)));
    }

    #[test]
    fn parse_amount_rejects_empty_input() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("   ").is_err());
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("setecientos").is_err());
    }

    #[test]
    fn parse_percentage_tolerates_percent_sign() {
        assert_eq!(parse_percentage("30%"), Ok(dec!(30)));
        assert_eq!(parse_percentage("12.5%"), Ok(dec!(12.5)));
        assert_eq!(parse_percentage("0"), Ok(dec!(0)));
    }

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1086.35)), "$1,086.35");
        assert_eq!(format_currency(dec!(1234567.89)), "$1,234,567.89");
    }

    #[test]
    fn format_currency_pads_to_two_decimals() {
        assert_eq!(format_currency(dec!(700)), "$700.00");
        assert_eq!(format_currency(dec!(0.5)), "$0.50");
    }

    #[test]
    fn format_currency_handles_zero_and_negative() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(-42.5)), "-$42.50");
    }
}
