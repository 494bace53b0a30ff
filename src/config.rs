//! Run configuration, from the command line or a TOML file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a crossover study run
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "crossover_study")]
#[command(about = "Simple moving average crossover backtest against buy-and-hold")]
pub struct Config {
    /// Asset symbol, e.g. BTCUSDT
    #[arg(long, default_value = "BTCUSDT")]
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Bybit market category used when downloading prices
    #[arg(long, default_value = "spot")]
    #[serde(default = "default_category")]
    pub category: String,

    /// First day of the evaluation period (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-01")]
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last day of the evaluation period, inclusive (default: today)
    #[arg(long)]
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Short moving average window in days
    #[arg(long, default_value_t = 10)]
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    /// Long moving average window in days
    #[arg(long, default_value_t = 40)]
    #[serde(default = "default_long_window")]
    pub long_window: usize,

    /// Starting capital of both portfolios
    #[arg(long, default_value_t = 10000.0)]
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,

    /// Local price file (YYYYMMDD ... close); skips the download when set
    #[arg(long)]
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Directory under which the timestamped output directory is created
    #[arg(long, default_value = ".")]
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    #[serde(default)]
    pub no_charts: bool,

    /// TOML file with the options above; replaces command-line values
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

fn default_symbol() -> String { "BTCUSDT".to_string() }
fn default_category() -> String { "spot".to_string() }
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}
fn default_short_window() -> usize { 10 }
fn default_long_window() -> usize { 40 }
fn default_initial_balance() -> f64 { 10000.0 }
fn default_output_root() -> PathBuf { PathBuf::from(".") }

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            category: default_category(),
            start_date: default_start_date(),
            end_date: None,
            short_window: default_short_window(),
            long_window: default_long_window(),
            initial_balance: default_initial_balance(),
            data_file: None,
            output_root: default_output_root(),
            no_charts: false,
            config: None,
        }
    }
}

impl Config {
    /// Parse the command line, then swap in the TOML file if `--config` was given.
    pub fn load() -> Result<Self> {
        Config::parse().apply_config_file()
    }

    /// Replace `self` by the contents of its `--config` file, if one was named.
    pub fn apply_config_file(self) -> Result<Self> {
        match &self.config {
            Some(path) => {
                let mut config = Config::from_file(path)?;
                config.config = Some(path.clone());
                Ok(config)
            }
            None => Ok(self),
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 {
            anyhow::bail!("short_window must be greater than 0");
        }

        if self.long_window == 0 {
            anyhow::bail!("long_window must be greater than 0");
        }

        if !(self.initial_balance.is_finite() && self.initial_balance > 0.0) {
            anyhow::bail!(
                "initial_balance must be positive, got {}",
                self.initial_balance
            );
        }

        if let Some(end) = self.end_date {
            if self.start_date > end {
                anyhow::bail!("start_date {} is after end_date {}", self.start_date, end);
            }
        }

        if self.symbol.trim().is_empty() {
            anyhow::bail!("symbol must not be empty");
        }

        Ok(())
    }

    /// End of the evaluation period, falling back to `today`.
    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }
}
