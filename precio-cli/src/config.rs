use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional CLI configuration, read from a TOML file.
///
/// Everything is optional; command-line flags override config values, and
/// config values override the built-in defaults (monthly period, 16% IVA,
/// built-in tariffs).
///
/// ```toml
/// default_period = "quincenal"
/// vat_rate = "0.16"
/// tariff_file = "tarifas.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Period used when a command does not pass `--period`.
    pub default_period: Option<String>,

    /// Flat IVA rate as a fraction.
    pub vat_rate: Option<Decimal>,

    /// CSV file replacing the built-in tariff schedule.
    pub tariff_file: Option<PathBuf>,
}

impl CliConfig {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("cannot parse config file '{}'", path.display()))
    }
}
