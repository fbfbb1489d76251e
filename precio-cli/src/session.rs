//! Interactive pricing session: a line-oriented command loop with a
//! session-scoped, user-clearable calculation history.

use std::io::{BufRead, Write};

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use tracing::debug;

use precio_core::{
    BracketTaxEvaluator, CostSolver, CostSolverConfig, Period, PriceSolver, PricingRequest,
    SolverConfig, TaxSchedule,
};

use crate::report;
use crate::utils::{format_currency, parse_amount, parse_percentage};

/// One saved calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub at: DateTime<Local>,
    pub base_cost: Decimal,
    pub profit_percentage: Decimal,
    pub period: Period,
    pub final_price: Decimal,
    pub net_profit: Decimal,
}

/// Append-only log of the session's calculations.
///
/// Owned by the session that created it and passed where needed; cleared only
/// on the explicit `clear` command. Deliberately not a process-wide
/// singleton: a future multi-session host gets one per session for free.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn push(
        &mut self,
        entry: HistoryEntry,
    ) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const HELP_TEXT: &str = "\
Comandos disponibles:
  price <costo> <utilidad%>   calcula el precio final
  cost <precio> <utilidad%>   estima el costo base para un precio objetivo
  tax <monto>                 ISR sobre un monto
  period <periodo>            cambia el periodo (diario|semanal|decenal|quincenal|mensual)
  history                     muestra el historial de la sesion
  share                       resumen compartible del ultimo calculo
  clear                       borra el historial
  help                        esta ayuda
  quit                        termina la sesion
";

/// The interactive session: solvers plus mutable session state.
pub struct Session<'a> {
    schedule: &'a TaxSchedule,
    forward: PriceSolver<'a>,
    inverse: CostSolver<'a>,
    vat_rate: Decimal,
    period: Period,
    history: SessionHistory,
}

impl<'a> Session<'a> {
    pub fn new(
        schedule: &'a TaxSchedule,
        vat_rate: Decimal,
        period: Period,
    ) -> Self {
        let forward = PriceSolver::new(schedule, SolverConfig::new(vat_rate));
        let inverse = CostSolver::new(forward, CostSolverConfig::default());
        Self {
            schedule,
            forward,
            inverse,
            vat_rate,
            period,
            history: SessionHistory::default(),
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Handles one input line. Returns the reply to print, or `None` when the
    /// user asked to quit.
    pub fn handle_line(
        &mut self,
        line: &str,
    ) -> Option<String> {
        let mut parts = line.split_whitespace();
        let verb = match parts.next() {
            Some(v) => v,
            None => return Some(String::new()),
        };
        let args: Vec<&str> = parts.collect();

        let reply = match verb {
            "price" => self.cmd_price(&args),
            "cost" => self.cmd_cost(&args),
            "tax" => self.cmd_tax(&args),
            "period" => self.cmd_period(&args),
            "history" => self.cmd_history(),
            "share" => self.cmd_share(),
            "clear" => {
                self.history.clear();
                "Historial borrado.".to_string()
            }
            "help" => HELP_TEXT.to_string(),
            "quit" | "exit" | "salir" => return None,
            other => format!("Comando desconocido: '{other}'. Escribe 'help' para ver los comandos."),
        };
        Some(reply)
    }

    /// Runs the loop over `input`, writing prompts and replies to `output`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> anyhow::Result<()> {
        writeln!(
            output,
            "Calculadora de precios (periodo {}). Escribe 'help' para ver los comandos.",
            self.period
        )?;

        for line in input.lines() {
            let line = line?;
            match self.handle_line(&line) {
                Some(reply) => {
                    if !reply.is_empty() {
                        writeln!(output, "{reply}")?;
                    }
                }
                None => break,
            }
        }
        debug!(calculations = self.history.len(), "session ended");
        Ok(())
    }

    fn cmd_price(
        &mut self,
        args: &[&str],
    ) -> String {
        let [cost, profit] = args else {
            return "Uso: price <costo> <utilidad%>".to_string();
        };
        let base_cost = match parse_amount(cost) {
            Ok(v) => v,
            Err(e) => return e.to_string(),
        };
        let profit_percentage = match parse_percentage(profit) {
            Ok(v) => v,
            Err(e) => return e.to_string(),
        };

        let request = PricingRequest::new(base_cost, profit_percentage, self.period);
        match self.forward.solve(&request) {
            Ok(result) => {
                self.history.push(HistoryEntry {
                    at: Local::now(),
                    base_cost,
                    profit_percentage,
                    period: self.period,
                    final_price: result.final_price,
                    net_profit: result.net_profit,
                });
                report::render_breakdown(&request, &result, self.vat_rate)
            }
            Err(e) => e.to_string(),
        }
    }

    fn cmd_cost(
        &mut self,
        args: &[&str],
    ) -> String {
        let [target, profit] = args else {
            return "Uso: cost <precio objetivo> <utilidad%>".to_string();
        };
        let target_price = match parse_amount(target) {
            Ok(v) => v,
            Err(e) => return e.to_string(),
        };
        let profit_percentage = match parse_percentage(profit) {
            Ok(v) => v,
            Err(e) => return e.to_string(),
        };

        match self
            .inverse
            .solve_for_cost(target_price, profit_percentage, self.period)
        {
            Ok(solution) => report::render_cost_estimate(&solution, target_price, self.period),
            Err(e) => e.to_string(),
        }
    }

    fn cmd_tax(
        &self,
        args: &[&str],
    ) -> String {
        let [amount] = args else {
            return "Uso: tax <monto>".to_string();
        };
        let amount = match parse_amount(amount) {
            Ok(v) => v,
            Err(e) => return e.to_string(),
        };

        let evaluator = BracketTaxEvaluator::new(self.schedule);
        match evaluator.evaluate(amount, self.period) {
            Ok(tax) => format!(
                "ISR sobre {} (periodo {}): {}",
                format_currency(amount),
                self.period,
                format_currency(tax)
            ),
            Err(e) => e.to_string(),
        }
    }

    fn cmd_period(
        &mut self,
        args: &[&str],
    ) -> String {
        let [name] = args else {
            return format!("Periodo actual: {}. Uso: period <periodo>", self.period);
        };
        match Period::parse(name) {
            Some(period) => {
                self.period = period;
                format!("Periodo cambiado a {period}.")
            }
            None => format!(
                "Periodo desconocido '{name}'. Validos: diario, semanal, decenal, quincenal, mensual."
            ),
        }
    }

    fn cmd_history(&self) -> String {
        if self.history.is_empty() {
            return "No hay calculos en el historial.".to_string();
        }
        let mut out = String::new();
        for (i, entry) in self.history.entries().iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. [{}] {} costo {} utilidad {}% precio {}\n",
                i + 1,
                entry.at.format("%Y-%m-%d %H:%M"),
                entry.period,
                format_currency(entry.base_cost),
                entry.profit_percentage.normalize(),
                format_currency(entry.final_price)
            ));
        }
        out
    }

    fn cmd_share(&self) -> String {
        match self.history.latest() {
            Some(entry) => report::share_text(
                entry.period,
                entry.final_price,
                entry.net_profit,
                self.vat_rate,
            ),
            None => "No hay calculos en el historial.".to_string(),
        }
    }
}
