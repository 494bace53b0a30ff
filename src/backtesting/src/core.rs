use finance_tools::{ensure_aligned, FinanceError, PriceSeries, Result};
use log::debug;

use crate::models::{BacktestResult, EquityPoint, Signal, SignalState};

/// Per-day price relatives `close[i] / close[i - 1]`.
///
/// The first day has no previous close and gets a neutral 1.0. Every close
/// must be finite and positive, otherwise the index of the first bad close
/// is reported.
pub fn asset_returns(prices: &PriceSeries) -> Result<Vec<f64>> {
    let points = prices.points();

    if let Some((index, point)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.close.is_finite() && p.close > 0.0))
    {
        return Err(FinanceError::InvalidPriceData {
            index,
            close: point.close,
        });
    }

    let mut returns = Vec::with_capacity(points.len());
    if !points.is_empty() {
        returns.push(1.0);
    }
    returns.extend(points.windows(2).map(|w| w[1].close / w[0].close));
    Ok(returns)
}

/// Simulate the crossover strategy against buy-and-hold.
///
/// The signal at day `i` decides whether the return from `i - 1` to `i` is
/// earned. Values are `initial_balance` times the running product of the
/// applied returns, so both curves start at `initial_balance`.
///
/// # Arguments
/// * `prices` - Daily closes
/// * `signal` - LONG/FLAT state per day, on the same dates as `prices`
/// * `initial_balance` - Starting capital, must be positive
pub fn run_backtest(
    prices: &PriceSeries,
    signal: &Signal,
    initial_balance: f64,
) -> Result<BacktestResult> {
    ensure_aligned(prices.dates(), signal.dates())?;

    if !(initial_balance.is_finite() && initial_balance > 0.0) {
        return Err(FinanceError::InvalidParameter(format!(
            "initial balance must be positive, got {}",
            initial_balance
        )));
    }

    let returns = asset_returns(prices)?;

    let mut strategy_growth = 1.0;
    let mut baseline_growth = 1.0;

    let points: Vec<EquityPoint> = prices
        .points()
        .iter()
        .zip(signal.points())
        .zip(&returns)
        .map(|((price, day), &r)| {
            let applied = match day.state {
                SignalState::Long => r,
                SignalState::Flat => 1.0,
            };
            strategy_growth *= applied;
            baseline_growth *= r;

            EquityPoint {
                date: price.date,
                strategy_value: initial_balance * strategy_growth,
                baseline_value: initial_balance * baseline_growth,
            }
        })
        .collect();

    debug!(
        "backtest over {} days: strategy x{:.4}, buy-and-hold x{:.4}",
        points.len(),
        strategy_growth,
        baseline_growth
    );

    Ok(BacktestResult::new(initial_balance, points))
}
