use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::{BacktestResult, TradeSide, Transition};

/// Headline numbers of a crossover run compared with buy-and-hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub initial_capital: f64,
    pub buy_hold_final: f64,
    pub strategy_final: f64,
    /// Strategy final value minus buy-and-hold final value.
    pub outperformance: f64,
    /// Buy signals plus sell signals.
    pub total_trades: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub strategy_return_pct: f64,
    pub buy_hold_return_pct: f64,
}

impl PerformanceSummary {
    pub fn from_run(result: &BacktestResult, transitions: &[Transition]) -> Self {
        let initial_capital = result.initial_balance();
        let strategy_final = result.final_strategy_value();
        let buy_hold_final = result.final_baseline_value();

        let buy_signals = transitions
            .iter()
            .filter(|t| t.side == TradeSide::Buy)
            .count();
        let sell_signals = transitions.len() - buy_signals;

        Self {
            initial_capital,
            buy_hold_final,
            strategy_final,
            outperformance: strategy_final - buy_hold_final,
            total_trades: buy_signals + sell_signals,
            buy_signals,
            sell_signals,
            strategy_return_pct: (strategy_final / initial_capital - 1.0) * 100.0,
            buy_hold_return_pct: (buy_hold_final / initial_capital - 1.0) * 100.0,
        }
    }
}

/// Simple daily returns `v[i] / v[i - 1] - 1` of an equity curve.
pub fn equity_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Calculate performance metrics
pub fn calculate_metrics(daily_returns: &[f64], risk_free_rate: f64) -> FxHashMap<String, f64> {
    let mut metrics = FxHashMap::default();
    let n = daily_returns.len();

    if n == 0 {
        return metrics;
    }

    // Total Return (cumulative)
    let total_return = daily_returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
    metrics.insert("Total Return".to_string(), total_return);

    let mean_return = daily_returns.iter().sum::<f64>() / n as f64;
    metrics.insert("Mean Daily Return".to_string(), mean_return);

    // Sample statistics need at least two observations
    let (volatility, sharpe) = if n > 1 {
        let variance = daily_returns
            .iter()
            .map(|r| (r - mean_return).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;

        // Assuming risk_free_rate is annual, convert to daily approx
        let daily_rf = (1.0 + risk_free_rate).powf(1.0 / 252.0) - 1.0;
        let mean_excess = mean_return - daily_rf;
        let std_excess = variance.sqrt();
        let sharpe = if std_excess > 1e-9 {
            (mean_excess / std_excess) * 252.0_f64.sqrt()
        } else {
            0.0
        };
        (variance.sqrt(), sharpe)
    } else {
        (0.0, 0.0)
    };
    metrics.insert("Daily Volatility".to_string(), volatility);
    metrics.insert("Annualized Volatility".to_string(), volatility * 252.0_f64.sqrt());
    metrics.insert("Sharpe Ratio".to_string(), sharpe);

    // Max Drawdown
    let mut max_drawdown = 0.0;
    let mut peak = 1.0;
    let mut current_value = 1.0;

    for r in daily_returns {
        current_value *= 1.0 + r;
        if current_value > peak {
            peak = current_value;
        }
        let drawdown = (peak - current_value) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }
    metrics.insert("Max Drawdown".to_string(), max_drawdown);

    metrics
}
