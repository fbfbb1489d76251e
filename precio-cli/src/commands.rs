use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use tracing::{debug, info};

use precio_core::{
    BracketTaxEvaluator, CostSolver, CostSolverConfig, Period, PriceSolver, PricingRequest,
    SolverConfig, TaxSchedule,
};
use precio_data::{IVA_RATE, TariffLoader, sat_2026};

use crate::cli::{Cli, Command};
use crate::config::CliConfig;
use crate::report;
use crate::session::Session;
use crate::utils::{format_currency, parse_amount, parse_percentage};

/// Resolved runtime context: tariffs, IVA rate and default period, after
/// applying the precedence chain (flags over config file over built-ins).
pub struct AppContext {
    pub schedule: TaxSchedule,
    pub vat_rate: Decimal,
    pub default_period: Period,
}

impl AppContext {
    fn resolve(
        config_path: Option<&Path>,
        tariffs_path: Option<&Path>,
        vat_flag: Option<Decimal>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        let tariffs_path = tariffs_path.or(config.tariff_file.as_deref());
        let schedule = match tariffs_path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open tariff file '{}'", path.display()))?;
                let schedule = TariffLoader::load(file)
                    .with_context(|| format!("invalid tariff file '{}'", path.display()))?;
                info!(path = %path.display(), "loaded replacement tariffs");
                schedule
            }
            None => sat_2026().context("built-in tariff schedule failed validation")?,
        };

        let vat_rate = vat_flag.or(config.vat_rate).unwrap_or(IVA_RATE);

        let default_period = match config.default_period.as_deref() {
            Some(name) => Period::parse(name)
                .with_context(|| format!("unknown default_period '{name}' in config"))?,
            None => Period::Mensual,
        };

        debug!(%vat_rate, %default_period, "resolved context");
        Ok(Self {
            schedule,
            vat_rate,
            default_period,
        })
    }

    fn period_or_default(
        &self,
        flag: Option<&str>,
    ) -> Result<Period> {
        match flag {
            Some(name) => match Period::parse(name) {
                Some(period) => Ok(period),
                None => bail!(
                    "unknown period '{name}' (expected diario, semanal, decenal, quincenal or mensual)"
                ),
            },
            None => Ok(self.default_period),
        }
    }
}

/// Parses arguments, resolves the context and runs the requested command.
pub fn run(cli: Cli) -> Result<()> {
    let context = AppContext::resolve(
        cli.config.as_deref(),
        cli.tariffs.as_deref(),
        cli.vat,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Price {
            cost,
            profit,
            period,
            json,
        } => run_price(&context, &cost, &profit, period.as_deref(), json, &mut out),
        Command::Cost {
            target,
            profit,
            period,
        } => run_cost(&context, &target, &profit, period.as_deref(), &mut out),
        Command::Tax { amount, period } => {
            run_tax(&context, &amount, period.as_deref(), &mut out)
        }
        Command::Brackets { period } => run_brackets(&context, period.as_deref(), &mut out),
        Command::Session => {
            let stdin = io::stdin();
            let mut session = Session::new(
                &context.schedule,
                context.vat_rate,
                context.default_period,
            );
            session.run(stdin.lock(), &mut out)
        }
    }
}

fn run_price<W: Write>(
    context: &AppContext,
    cost: &str,
    profit: &str,
    period: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let period = context.period_or_default(period)?;
    let base_cost = parse_amount(cost)?;
    let profit_percentage = parse_percentage(profit)?;

    let solver = PriceSolver::new(&context.schedule, SolverConfig::new(context.vat_rate));
    let request = PricingRequest::new(base_cost, profit_percentage, period);
    let result = solver.solve(&request)?;

    if json {
        let encoded = serde_json::to_string_pretty(&result)
            .context("cannot encode pricing result as JSON")?;
        writeln!(out, "{encoded}")?;
    } else {
        write!(out, "{}", report::render_breakdown(&request, &result, context.vat_rate))?;
    }
    Ok(())
}

fn run_cost<W: Write>(
    context: &AppContext,
    target: &str,
    profit: &str,
    period: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let period = context.period_or_default(period)?;
    let target_price = parse_amount(target)?;
    let profit_percentage = parse_percentage(profit)?;

    let forward = PriceSolver::new(&context.schedule, SolverConfig::new(context.vat_rate));
    let inverse = CostSolver::new(forward, CostSolverConfig::default());
    let solution = inverse.solve_for_cost(target_price, profit_percentage, period)?;

    write!(out, "{}", report::render_cost_estimate(&solution, target_price, period))?;
    Ok(())
}

fn run_tax<W: Write>(
    context: &AppContext,
    amount: &str,
    period: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let period = context.period_or_default(period)?;
    let amount = parse_amount(amount)?;

    let evaluator = BracketTaxEvaluator::new(&context.schedule);
    let tax = evaluator.evaluate(amount, period)?;

    writeln!(
        out,
        "ISR sobre {} (periodo {period}): {}",
        format_currency(amount),
        format_currency(tax)
    )?;
    Ok(())
}

fn run_brackets<W: Write>(
    context: &AppContext,
    period: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let period = context.period_or_default(period)?;
    write!(
        out,
        "{}",
        report::render_tariff(period, context.schedule.table(period))
    )?;
    Ok(())
}
