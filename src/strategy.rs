//! Moving average crossover strategy: the full price-to-equity pipeline.

use backtesting::{
    detect_transitions, generate_signal, run_backtest, BacktestResult, PerformanceSummary,
    Signal, Transition,
};
use finance_tools::{FinanceError, MovingAverageSeries, PriceSeries, Result};
use indicators::rolling_mean;
use log::debug;

/// Long while the short SMA is above the long SMA, flat otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverStrategy {
    short_window: usize,
    long_window: usize,
}

impl CrossoverStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self> {
        if short_window == 0 || long_window == 0 {
            return Err(FinanceError::InvalidParameter(format!(
                "moving average windows must be at least 1, got {}/{}",
                short_window, long_window
            )));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// Run the whole pipeline on `prices`.
    ///
    /// Nothing is carried between calls; every evaluation recomputes the
    /// averages, signal and equity curves from the prices alone.
    pub fn evaluate(&self, prices: &PriceSeries, initial_balance: f64) -> Result<StrategyRun> {
        let short_ma = rolling_mean(prices, self.short_window)?;
        let long_ma = rolling_mean(prices, self.long_window)?;
        let signal = generate_signal(&short_ma, &long_ma)?;
        let transitions = detect_transitions(&signal);
        let result = run_backtest(prices, &signal, initial_balance)?;

        debug!(
            "{}/{} crossover: {} transitions over {} days",
            self.short_window,
            self.long_window,
            transitions.len(),
            prices.len()
        );

        Ok(StrategyRun {
            short_ma,
            long_ma,
            signal,
            transitions,
            result,
        })
    }
}

/// Everything derived from one evaluation, aligned on the price dates.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    short_ma: MovingAverageSeries,
    long_ma: MovingAverageSeries,
    signal: Signal,
    transitions: Vec<Transition>,
    result: BacktestResult,
}

impl StrategyRun {
    pub fn short_ma(&self) -> &MovingAverageSeries {
        &self.short_ma
    }

    pub fn long_ma(&self) -> &MovingAverageSeries {
        &self.long_ma
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn result(&self) -> &BacktestResult {
        &self.result
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary::from_run(&self.result, &self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtesting::TradeSide;
    use chrono::NaiveDate;

    fn prices(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), closes)
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(CrossoverStrategy::new(0, 40).is_err());
        assert!(CrossoverStrategy::new(10, 0).is_err());
        assert!(CrossoverStrategy::new(10, 40).is_ok());
    }

    #[test]
    fn test_evaluate_small_example() {
        let strategy = CrossoverStrategy::new(1, 2).unwrap();
        let run = strategy
            .evaluate(&prices(&[100.0, 110.0, 100.0, 121.0]), 1000.0)
            .unwrap();

        assert_eq!(run.long_ma().values(), vec![100.0, 105.0, 105.0, 110.5]);
        let sides: Vec<TradeSide> = run.transitions().iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![TradeSide::Buy, TradeSide::Sell, TradeSide::Buy]);
        assert!((run.result().final_strategy_value() - 1331.0).abs() < 1e-9);

        let summary = run.summary();
        assert_eq!(summary.total_trades, 3);
        assert!((summary.outperformance - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_is_repeatable() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 / 7.0).cos() * 4.0).collect();
        let strategy = CrossoverStrategy::new(10, 40).unwrap();
        let p = prices(&closes);
        assert_eq!(
            strategy.evaluate(&p, 10000.0).unwrap(),
            strategy.evaluate(&p, 10000.0).unwrap()
        );
    }

    #[test]
    fn test_partial_windows_tie_until_short_window_fills() {
        // Both averages cover the same closes until day 3, so they are equal
        // and the signal stays flat.
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let run = CrossoverStrategy::new(3, 9)
            .unwrap()
            .evaluate(&prices(&closes), 100.0)
            .unwrap();
        assert_eq!(run.signal().state(0), Some(backtesting::SignalState::Flat));
        assert_eq!(run.signal().state(2), Some(backtesting::SignalState::Flat));
        assert_eq!(run.transitions().len(), 1);
        assert_eq!(run.transitions()[0].index, 3);
        assert_eq!(run.transitions()[0].side, TradeSide::Buy);
    }
}
