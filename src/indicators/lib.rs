//! Technical indicators computed over a [`finance_tools::PriceSeries`].

pub mod trend;

pub use trend::{rolling_mean, rolling_mean_values};
