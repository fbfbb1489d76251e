use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Tax-aware retail price calculator (SAT: ISR + IVA).
///
/// Computes the price to charge so the seller keeps a target net profit after
/// the progressive ISR withholding and the flat 16% IVA. Amounts accept
/// thousands separators and a leading `$`.
#[derive(Debug, Parser)]
#[command(name = "precio", version, about, long_about = None)]
pub struct Cli {
    /// TOML config file (default period, IVA rate, tariff file).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV file replacing the built-in SAT tariffs.
    #[arg(long, global = true)]
    pub tariffs: Option<PathBuf>,

    /// Flat IVA rate as a fraction (e.g. 0.16).
    #[arg(long, global = true)]
    pub vat: Option<Decimal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Final price from base cost and desired profit.
    Price {
        /// Base cost of the product or service.
        #[arg(long)]
        cost: String,

        /// Desired net profit percentage (0-200).
        #[arg(long)]
        profit: String,

        /// Payment period (diario|semanal|decenal|quincenal|mensual).
        #[arg(long)]
        period: Option<String>,

        /// Emit the breakdown as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Base cost estimate from a target final price.
    Cost {
        /// Target final price, IVA included.
        #[arg(long)]
        target: String,

        /// Desired net profit percentage (0-200).
        #[arg(long)]
        profit: String,

        /// Payment period (diario|semanal|decenal|quincenal|mensual).
        #[arg(long)]
        period: Option<String>,
    },

    /// ISR owed on an amount under a period's tariff.
    Tax {
        /// Amount to evaluate.
        #[arg(long)]
        amount: String,

        /// Payment period (diario|semanal|decenal|quincenal|mensual).
        #[arg(long)]
        period: Option<String>,
    },

    /// Print a period's tariff table.
    Brackets {
        /// Payment period (diario|semanal|decenal|quincenal|mensual).
        #[arg(long)]
        period: Option<String>,
    },

    /// Interactive session with history and shareable summaries.
    Session,
}
