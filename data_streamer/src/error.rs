use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamerError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("Malformed kline: {0}")]
    MalformedKline(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, StreamerError>;
