use thiserror::Error;

/// Precondition violations raised by the moving average, signal and
/// backtest components. None of them are recoverable; callers get the
/// error back before any partial output is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinanceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "Misaligned series: left has {left_len} points, right has {right_len}, first mismatch at index {index}"
    )]
    MisalignedSeries {
        left_len: usize,
        right_len: usize,
        index: usize,
    },

    #[error("Invalid price data at index {index}: close = {close}")]
    InvalidPriceData { index: usize, close: f64 },
}

pub type Result<T> = std::result::Result<T, FinanceError>;
