use finance_tools::{FinanceError, MovingAverageSeries, PriceSeries, Result, SeriesPoint};
use log::debug;

/// Calculates the Simple Moving Average (SMA) for a given data slice and window.
///
/// # Arguments
///
/// * `data` - A slice of f64 values.
/// * `window` - The window size for the moving average.
///
/// # Returns
///
/// A Vec<f64> with one value per input. Entries before the first full window
/// are the mean of the values seen so far, so nothing is left undefined.
/// A zero window yields an empty vector.
pub fn rolling_mean_values(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }

    let mut sma = Vec::with_capacity(data.len());
    let mut sum = 0.0;

    for i in 0..data.len() {
        if i >= window {
            // Drop the oldest value before adding the newest, so a one-day
            // window reproduces the input exactly.
            sum = sum - data[i - window] + data[i];
        } else {
            sum += data[i];
        }
        sma.push(sum / (i + 1).min(window) as f64);
    }

    sma
}

/// Rolling mean of the closes of `series` over a trailing `window`.
///
/// Index `i` holds the mean of closes `[max(0, i - window + 1), i]`.
pub fn rolling_mean(series: &PriceSeries, window: usize) -> Result<MovingAverageSeries> {
    if window < 1 {
        return Err(FinanceError::InvalidParameter(format!(
            "moving average window must be at least 1, got {}",
            window
        )));
    }

    let values = rolling_mean_values(&series.closes(), window);
    debug!("computed {}-day SMA over {} closes", window, values.len());

    let points = series
        .dates()
        .zip(values)
        .map(|(date, value)| SeriesPoint { date, value })
        .collect();

    Ok(MovingAverageSeries::new(window, points))
}
