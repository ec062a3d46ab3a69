//! Plain-text reports for terminal output

use std::fmt::Write;

use dcplan_core::model::{DeterministicResult, MetricDistribution, MonteCarloResult, TornadoBar};

use crate::util::format::{
    format_compact_currency, format_currency, format_percentage, format_years,
};

/// Width of the widest histogram or tornado bar
const BAR_WIDTH: usize = 40;

fn metric_row(out: &mut String, label: &str, metric: &MetricDistribution, fmt: fn(f64) -> String) {
    let summary = &metric.summary;
    let Some(stats) = summary.stats.as_ref() else {
        let _ = writeln!(out, "  {label:<10} undefined in all {} trials", summary.excluded);
        return;
    };
    let p = &stats.percentiles;
    let _ = writeln!(
        out,
        "  {label:<10} mean {:>14}  P10 {:>14}  P50 {:>14}  P90 {:>14}",
        fmt(stats.mean),
        fmt(p.p10),
        fmt(p.p50),
        fmt(p.p90),
    );
    if summary.excluded > 0 {
        let _ = writeln!(out, "  {:<10} ({} trials undefined)", "", summary.excluded);
    }
}

fn histogram_lines(out: &mut String, metric: &MetricDistribution) {
    let max_count = metric.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    if max_count == 0 {
        return;
    }
    for bin in &metric.histogram {
        let width = bin.count * BAR_WIDTH / max_count;
        let _ = writeln!(
            out,
            "  {:>9} .. {:>9} |{:<BAR_WIDTH$}| {}",
            format_compact_currency(bin.start),
            format_compact_currency(bin.end),
            "#".repeat(width),
            bin.count,
        );
    }
}

/// Summary of a Monte Carlo run
pub fn monte_carlo_report(result: &MonteCarloResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Monte Carlo: {} iterations, seed {}, {:.2?}",
        result.iterations, result.seed, result.duration
    );
    let _ = writeln!(
        out,
        "Baseline NPV {}  IRR {}  payback {}",
        format_currency(result.baseline.npv),
        format_percentage(result.baseline.irr.unwrap_or(f64::NAN)),
        format_years(result.baseline.payback_years.unwrap_or(f64::NAN)),
    );

    if result.out_of_domain_trials > 0 {
        let _ = writeln!(
            out,
            "{} trials drew parameters outside their admissible range and were not evaluated",
            result.out_of_domain_trials
        );
    }

    let _ = writeln!(out, "\nDistributions");
    metric_row(&mut out, "NPV", &result.npv, format_currency);
    metric_row(&mut out, "IRR", &result.irr, format_percentage);
    metric_row(&mut out, "Payback", &result.payback_years, format_years);

    let _ = writeln!(out, "\nRisk");
    let _ = writeln!(
        out,
        "  VaR (5%)            {}",
        format_currency(result.value_at_risk_5.unwrap_or(f64::NAN))
    );
    let _ = writeln!(
        out,
        "  Expected shortfall  {}",
        format_currency(result.expected_shortfall_5.unwrap_or(f64::NAN))
    );
    let _ = writeln!(
        out,
        "  P(NPV < 0)          {}",
        format_percentage(result.probability_negative_npv)
    );
    let _ = writeln!(
        out,
        "  P(IRR < {})     {}",
        format_percentage(result.hurdle_rate),
        format_percentage(result.probability_irr_below_hurdle)
    );

    if !result.sensitivity.is_empty() {
        let _ = writeln!(out, "\nSensitivity (correlation with NPV)");
        for entry in &result.sensitivity {
            let _ = writeln!(out, "  {:<28} {:>+.3}", entry.name, entry.correlation);
        }
    }

    let _ = writeln!(out, "\nNPV histogram");
    histogram_lines(&mut out, &result.npv);
    out
}

/// Year-by-year schedule and headline metrics of a deterministic run
pub fn baseline_report(result: &DeterministicResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Occ", "Revenue", "OPEX", "Tax", "FCF", "Cumulative"
    );
    for year in &result.schedule {
        let _ = writeln!(
            out,
            "{:>4} {:>6.1} {:>14} {:>14} {:>14} {:>14} {:>14}",
            year.year,
            year.occupancy * 100.0,
            format_currency(year.revenue),
            format_currency(year.opex),
            format_currency(year.tax),
            format_currency(year.free_cash_flow),
            format_currency(year.cumulative_free_cash_flow),
        );
    }
    let _ = writeln!(
        out,
        "\nNPV {}  IRR {}  payback {}",
        format_currency(result.npv),
        format_percentage(result.irr.unwrap_or(f64::NAN)),
        format_years(result.payback_years.unwrap_or(f64::NAN)),
    );
    out
}

/// Tornado chart; bars are scaled to the widest swing
pub fn tornado_report(baseline_npv: f64, bars: &[TornadoBar]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Baseline NPV {}", format_currency(baseline_npv));
    if bars.is_empty() {
        let _ = writeln!(out, "No enabled variables");
        return out;
    }

    let max_swing = bars.iter().map(TornadoBar::swing).fold(0.0_f64, f64::max);
    for bar in bars {
        let width = if max_swing > 0.0 {
            (bar.swing() / max_swing * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<28} {:>10} .. {:>10} |{:<BAR_WIDTH$}| swing {}",
            bar.name,
            format_compact_currency(bar.npv_at_low),
            format_compact_currency(bar.npv_at_high),
            "=".repeat(width),
            format_compact_currency(bar.swing()),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplan_core::model::{
        FinancialParameters, StochasticVariable, VariableDistribution, VariableTarget,
    };
    use dcplan_core::{cashflow, sensitivity, simulation};

    #[test]
    fn test_monte_carlo_report_sections() {
        let result = simulation::run(
            &FinancialParameters::reference(),
            &StochasticVariable::standard_set(),
            500,
            42,
        )
        .unwrap();
        let report = monte_carlo_report(&result);

        assert!(report.contains("500 iterations, seed 42"));
        assert!(report.contains("VaR (5%)"));
        assert!(report.contains("P(NPV < 0)"));
        assert!(report.contains("Revenue Multiplier"));
        assert!(report.contains("NPV histogram"));
        assert!(!report.contains("admissible range"));
    }

    #[test]
    fn test_monte_carlo_report_counts_unevaluated_trials() {
        let variables = vec![StochasticVariable::new(
            "discount_rate",
            "Discount Rate",
            VariableDistribution::Normal {
                mean: 0.10,
                std_dev: 1.0,
            },
            VariableTarget::DiscountRate,
        )];
        let result =
            simulation::run(&FinancialParameters::reference(), &variables, 500, 42).unwrap();
        assert!(result.out_of_domain_trials > 0);

        let report = monte_carlo_report(&result);
        assert!(report.contains(&format!(
            "{} trials drew parameters outside their admissible range",
            result.out_of_domain_trials
        )));
    }

    #[test]
    fn test_baseline_report_lists_every_year() {
        let result = cashflow::run_deterministic(&FinancialParameters::reference());
        let report = baseline_report(&result);
        // Header, 10 years, blank line, metrics
        assert_eq!(report.lines().count(), 13);
        assert!(report.contains("NPV $5,621,387"));
    }

    #[test]
    fn test_tornado_report() {
        let baseline = FinancialParameters::reference();
        let variables: Vec<_> = StochasticVariable::standard_set()
            .into_iter()
            .map(|v| v.enabled(true))
            .collect();
        let bars = sensitivity::tornado(&baseline, &variables).unwrap();
        let report = tornado_report(cashflow::run_deterministic(&baseline).npv, &bars);

        assert_eq!(report.lines().count(), 1 + bars.len());
        // The widest bar is drawn at full width
        assert!(report.contains(&"=".repeat(BAR_WIDTH)));

        assert!(tornado_report(0.0, &[]).contains("No enabled variables"));
    }
}
