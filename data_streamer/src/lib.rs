//! Daily price history from the Bybit v5 market API.
//!
//! - `bybit` - HTTP client, paginated daily kline download over a date range
//! - `kline` - Kline parsing, range filtering and the `YYYYMMDD O H L C` file format
//! - `error` - Provider errors, including an explicit "no data" case

pub mod bybit;
pub mod error;
pub mod kline;

pub use bybit::BybitClient;
pub use error::StreamerError;
pub use kline::{klines_to_series, Kline};
