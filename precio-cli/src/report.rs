//! Plain-text rendering of pricing results: the step-by-step breakdown, the
//! earnings summary, tariff tables and the shareable summary line.

use rust_decimal::Decimal;

use precio_core::{BracketTable, CostSolution, Period, PricingRequest, PricingResult};

use crate::utils::format_currency;

/// Percentage of `whole` that `part` represents, one decimal. `None` when the
/// whole is zero.
fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return None;
    }
    Some((part / whole * Decimal::ONE_HUNDRED).round_dp(1))
}

fn breakdown_line(
    label: &str,
    amount: Decimal,
) -> String {
    format!("  {label:<36}{:>14}\n", format_currency(amount))
}

fn summary_line(
    label: &str,
    amount: Decimal,
    final_price: Decimal,
) -> String {
    let share = percent_of(amount, final_price)
        .map(|p| format!("  ({p}% del precio)"))
        .unwrap_or_default();
    format!("  {label:<18}{:>14}{share}\n", format_currency(amount))
}

/// Renders the five-step price breakdown plus the earnings summary.
pub fn render_breakdown(
    request: &PricingRequest,
    result: &PricingResult,
    vat_rate: Decimal,
) -> String {
    let adjusted_profit = result.pre_tax_subtotal - request.base_cost;
    let vat_percent = (vat_rate * Decimal::ONE_HUNDRED).normalize();

    let mut out = String::new();
    out.push_str(&format!(
        "Desglose de precio (periodo {})\n\n",
        request.period
    ));
    out.push_str(&breakdown_line("Paso 1  Costo base", request.base_cost));
    out.push_str(&breakdown_line(
        &format!(
            "Paso 2  Utilidad deseada ({}%)",
            request.profit_percentage.normalize()
        ),
        result.net_profit,
    ));
    out.push_str(&breakdown_line(
        "        Utilidad ajustada por ISR",
        adjusted_profit,
    ));
    out.push_str(&breakdown_line("Paso 3  Subtotal sin IVA", result.pre_tax_subtotal));
    out.push_str(&breakdown_line(
        &format!("Paso 4  IVA ({vat_percent}%)"),
        result.value_added_tax,
    ));
    out.push_str(&breakdown_line(
        "Paso 5  Precio final al publico",
        result.final_price,
    ));

    out.push_str("\nResumen de ganancias\n");
    out.push_str(&summary_line(
        "Utilidad neta",
        result.net_profit,
        result.final_price,
    ));
    out.push_str(&summary_line(
        "ISR a pagar",
        result.income_tax,
        result.final_price,
    ));
    out.push_str(&summary_line(
        "IVA recaudado",
        result.value_added_tax,
        result.final_price,
    ));
    out
}

/// Renders the outcome of an inverse solve.
pub fn render_cost_estimate(
    solution: &CostSolution,
    target_price: Decimal,
    period: Period,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Costo base estimado (periodo {period}): {}\n",
        format_currency(solution.base_cost)
    ));
    out.push_str(&format!(
        "Precio logrado: {} (objetivo {}, {} iteraciones)\n",
        format_currency(solution.final_price),
        format_currency(target_price),
        solution.iterations
    ));
    if !solution.converged {
        out.push_str("Nota: la estimacion no alcanzo la tolerancia; es la mejor aproximacion disponible.\n");
    }
    out
}

/// Renders one period's tariff table.
pub fn render_tariff(
    period: Period,
    table: &BracketTable,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tarifa {period} (ISR)\n"));
    out.push_str(&format!(
        "  {:<18}{:<18}{:<16}{}\n",
        "Limite inferior", "Limite superior", "Cuota fija", "% excedente"
    ));
    for bracket in table.brackets() {
        let upper = bracket
            .upper_bound
            .map(format_currency)
            .unwrap_or_else(|| "en adelante".to_string());
        out.push_str(&format!(
            "  {:<18}{:<18}{:<16}{}%\n",
            format_currency(bracket.lower_bound),
            upper,
            format_currency(bracket.base_quota),
            bracket.rate_over_excess
        ));
    }
    out
}

/// Builds the one-paragraph shareable summary for a computed price.
pub fn share_text(
    period: Period,
    final_price: Decimal,
    net_profit: Decimal,
    vat_rate: Decimal,
) -> String {
    let vat_percent = (vat_rate * Decimal::ONE_HUNDRED).normalize();
    format!(
        "El precio final de {} te permite obtener una ganancia neta de {} \
         despues de pagar el ISR (periodo {period}). IVA del {vat_percent}% incluido.",
        format_currency(final_price),
        format_currency(net_profit)
    )
}
