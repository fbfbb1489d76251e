use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use precio_core::{Bracket, BracketTable, BracketTableError, Period, TaxSchedule};

/// Errors that can occur when loading tariff data from CSV.
#[derive(Debug, Error)]
pub enum TariffLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("unknown period '{0}' (expected diario, semanal, decenal, quincenal or mensual)")]
    InvalidPeriod(String),

    #[error("tariff file has no rows for period '{0}'")]
    MissingPeriod(Period),

    #[error("invalid {period} tariff: {source}")]
    Table {
        period: Period,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for TariffLoaderError {
    fn from(err: csv::Error) -> Self {
        TariffLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a tariff CSV file.
///
/// Expected columns:
/// - `period`: one of `diario`, `semanal`, `decenal`, `quincenal`, `mensual`
/// - `lower_bound`: inclusive lower bound of the bracket
/// - `upper_bound`: inclusive upper bound (empty for the unbounded final row)
/// - `base_quota`: fixed tax accumulated by all lower brackets
/// - `rate`: marginal percentage over the excess (e.g. `6.40`)
///
/// Rows must be listed in ascending order within each period.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TariffRecord {
    pub period: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub base_quota: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for replacement tariff schedules.
///
/// Reads CSV rows, groups them by period, and validates each group through
/// [`BracketTable::new`], so a loaded schedule carries exactly the same
/// guarantees as the built-in one. All five periods must be present; there is
/// no partial schedule and no default table for a missing period.
pub struct TariffLoader;

impl TariffLoader {
    /// Parses tariff rows from a CSV reader.
    ///
    /// The reader can be any `Read`, such as a file or a string slice.
    ///
    /// # Errors
    ///
    /// Returns [`TariffLoaderError::CsvParse`] on malformed CSV.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TariffRecord>, TariffLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TariffRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Assembles parsed rows into a validated [`TaxSchedule`].
    ///
    /// # Errors
    ///
    /// Returns [`TariffLoaderError`] if a row names an unknown period, a
    /// period has no rows, or a period's rows fail table validation.
    pub fn assemble(records: &[TariffRecord]) -> Result<TaxSchedule, TariffLoaderError> {
        let mut grouped: [Vec<Bracket>; 5] = Default::default();

        for record in records {
            let period = Period::parse(&record.period)
                .ok_or_else(|| TariffLoaderError::InvalidPeriod(record.period.clone()))?;
            let rows = match period {
                Period::Diario => &mut grouped[0],
                Period::Semanal => &mut grouped[1],
                Period::Decenal => &mut grouped[2],
                Period::Quincenal => &mut grouped[3],
                Period::Mensual => &mut grouped[4],
            };
            rows.push(Bracket {
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                base_quota: record.base_quota,
                rate_over_excess: record.rate,
            });
        }

        let build = |period: Period, rows: Vec<Bracket>| {
            if rows.is_empty() {
                return Err(TariffLoaderError::MissingPeriod(period));
            }
            BracketTable::new(rows).map_err(|source| TariffLoaderError::Table { period, source })
        };

        let [diario, semanal, decenal, quincenal, mensual] = grouped;
        Ok(TaxSchedule::new(
            build(Period::Diario, diario)?,
            build(Period::Semanal, semanal)?,
            build(Period::Decenal, decenal)?,
            build(Period::Quincenal, quincenal)?,
            build(Period::Mensual, mensual)?,
        ))
    }

    /// Parses and assembles in one step.
    ///
    /// # Errors
    ///
    /// Any error from [`TariffLoader::parse`] or [`TariffLoader::assemble`].
    pub fn load<R: Read>(reader: R) -> Result<TaxSchedule, TariffLoaderError> {
        let records = Self::parse(reader)?;
        Self::assemble(&records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Two-bracket schedule for every period; enough structure to exercise
    /// grouping and validation.
    fn minimal_csv() -> String {
        let mut csv = String::from("period,lower_bound,upper_bound,base_quota,rate\n");
        for period in Period::ALL {
            csv.push_str(&format!("{period},0.00,99.99,0.00,2.00\n"));
            csv.push_str(&format!("{period},100.00,,2.00,10.00\n"));
        }
        csv
    }

    #[test]
    fn parse_reads_all_rows() {
        let records = TariffLoader::parse(minimal_csv().as_bytes()).unwrap();

        assert_eq!(records.len(), 10);
        assert_eq!(records[0].period, "diario");
        assert_eq!(records[0].upper_bound, Some(rust_decimal::Decimal::new(9999, 2)));
    }

    #[test]
    fn parse_maps_empty_upper_bound_to_unbounded() {
        let records = TariffLoader::parse(minimal_csv().as_bytes()).unwrap();

        assert_eq!(records[1].upper_bound, None);
    }

    #[test]
    fn parse_rejects_malformed_csv() {
        let csv = "period,lower_bound,upper_bound,base_quota,rate\nmensual,not-a-number,,0,2\n";

        let result = TariffLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(TariffLoaderError::CsvParse(_))));
    }

    #[test]
    fn load_builds_schedule_with_all_periods() {
        let schedule = TariffLoader::load(minimal_csv().as_bytes()).unwrap();

        for period in Period::ALL {
            assert_eq!(schedule.table(period).brackets().len(), 2, "{period}");
        }
    }

    #[test]
    fn assemble_rejects_unknown_period() {
        let csv = "period,lower_bound,upper_bound,base_quota,rate\nanual,0.00,,0.00,2.00\n";
        let records = TariffLoader::parse(csv.as_bytes()).unwrap();

        let result = TariffLoader::assemble(&records);

        assert!(matches!(
            result,
            Err(TariffLoaderError::InvalidPeriod(p)) if p == "anual"
        ));
    }

    #[test]
    fn assemble_rejects_missing_period() {
        // Everything except quincenal.
        let mut csv = String::from("period,lower_bound,upper_bound,base_quota,rate\n");
        for period in [Period::Diario, Period::Semanal, Period::Decenal, Period::Mensual] {
            csv.push_str(&format!("{period},0.00,,0.00,2.00\n"));
        }
        let records = TariffLoader::parse(csv.as_bytes()).unwrap();

        let result = TariffLoader::assemble(&records);

        assert!(matches!(
            result,
            Err(TariffLoaderError::MissingPeriod(Period::Quincenal))
        ));
    }

    #[test]
    fn assemble_rejects_malformed_table() {
        // First mensual bracket does not start at zero.
        let mut csv = String::from("period,lower_bound,upper_bound,base_quota,rate\n");
        for period in [Period::Diario, Period::Semanal, Period::Decenal, Period::Quincenal] {
            csv.push_str(&format!("{period},0.00,,0.00,2.00\n"));
        }
        csv.push_str("mensual,0.01,,0.00,2.00\n");
        let records = TariffLoader::parse(csv.as_bytes()).unwrap();

        let result = TariffLoader::assemble(&records);

        assert!(matches!(
            result,
            Err(TariffLoaderError::Table {
                period: Period::Mensual,
                ..
            })
        ));
    }
}
