use anyhow::Result;
use chrono::NaiveDate;
use finance_tools::MovingAverageSeries;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::metrics::PerformanceSummary;
use crate::models::{BacktestResult, Signal, Transition};

/// Everything a run produced, as written to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport<'a> {
    pub symbol: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub summary: &'a PerformanceSummary,
    pub strategy_metrics: BTreeMap<String, f64>,
    pub baseline_metrics: BTreeMap<String, f64>,
    pub short_ma: &'a MovingAverageSeries,
    pub long_ma: &'a MovingAverageSeries,
    pub signal: &'a Signal,
    pub transitions: &'a [Transition],
    pub result: &'a BacktestResult,
}

/// Format a dollar amount with thousands separators, e.g. `$12,345.60`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Render the performance summary as the plain-text report.
pub fn format_text_report(
    summary: &PerformanceSummary,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("{:=^50}\n", " Strategy Performance Analysis "));
    out.push_str(&format!(
        "Evaluation Period: {} - {}\n",
        format_date(start_date),
        format_date(end_date)
    ));
    out.push_str(&format!(
        "Starting Capital: {}\n",
        format_currency(summary.initial_capital)
    ));
    out.push('\n');
    out.push_str(&format!(
        "Buy and Hold Final Value: {}\n",
        format_currency(summary.buy_hold_final)
    ));
    out.push_str(&format!(
        "Crossover Strategy Final Value: {}\n",
        format_currency(summary.strategy_final)
    ));
    out.push_str(&format!(
        "Strategy Outperformance: {}\n",
        format_currency(summary.outperformance)
    ));
    out.push('\n');
    out.push_str(&format!("Total Trades Executed: {}\n", summary.total_trades));
    out.push_str(&format!("Buy Signals: {}\n", summary.buy_signals));
    out.push_str(&format!("Sell Signals: {}\n", summary.sell_signals));
    out.push('\n');
    out.push_str(&format!(
        "Strategy Return: {:.2}%\n",
        summary.strategy_return_pct
    ));
    out.push_str(&format!(
        "Buy/Hold Return: {:.2}%\n",
        summary.buy_hold_return_pct
    ));
    out
}

/// Write a text report
pub fn write_text_report<P: AsRef<Path>>(report: &str, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(report.as_bytes())?;
    Ok(())
}

/// Generate a JSON report
pub fn write_json_report<P: AsRef<Path>>(report: &BacktestReport<'_>, path: P) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
