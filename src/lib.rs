//! Simple moving average crossover study.
//!
//! Loads daily closes (from a local file or the Bybit market API), runs the
//! short/long SMA crossover strategy against buy-and-hold, and writes the
//! text report, JSON results and charts into a per-run output directory.

pub mod config;
pub mod io;
pub mod output;
pub mod strategy;
pub mod visualization;

pub use config::Config;
pub use io::{load_price_series, select_date_range};
pub use output::OutputLayout;
pub use strategy::{CrossoverStrategy, StrategyRun};
pub use visualization::{plot_performance_comparison, plot_price_chart, plot_trading_signals};
