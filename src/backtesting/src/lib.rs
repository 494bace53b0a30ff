//! Crossover signal generation and backtesting.
//!
//! # Modules
//!
//! - `models` - Signal, transition and equity curve types
//! - `signals` - LONG/FLAT signal from two moving averages, BUY/SELL transitions
//! - `core` - Strategy and buy-and-hold portfolio simulation
//! - `metrics` - Performance summary and equity curve statistics
//! - `report` - Text and JSON reports

pub mod core;
pub mod metrics;
pub mod models;
pub mod report;
pub mod signals;

pub use core::{asset_returns, run_backtest};
pub use metrics::{calculate_metrics, equity_returns, PerformanceSummary};
pub use models::{
    BacktestResult, EquityPoint, Signal, SignalPoint, SignalState, TradeSide, Transition,
};
pub use report::{
    format_currency, format_text_report, write_json_report, write_text_report, BacktestReport,
};
pub use signals::{detect_transitions, generate_signal};
