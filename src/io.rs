//! Loading daily price history from text files.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use finance_tools::{PricePoint, PriceSeries};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a price history file.
///
/// Expected format: `YYYYMMDD price1 [price2 price3 price4]`, one day per
/// line. The last column is used as the closing price. Dates must be
/// strictly increasing and prices positive.
pub fn load_price_series<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Cannot open market file '{}'", path.display()))?;

    let reader = BufReader::new(file);
    let mut points: Vec<PricePoint> = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Error reading line {}", line_num + 1))?;

        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split([' ', '\t', ',']).filter(|s| !s.is_empty()).collect();
        if parts.len() < 2 {
            bail!("Line {}: expected a date and a price", line_num + 1);
        }

        let date = NaiveDate::parse_from_str(parts[0], "%Y%m%d")
            .with_context(|| format!("Invalid date on line {}", line_num + 1))?;

        let close = parts[parts.len() - 1]
            .parse::<f64>()
            .with_context(|| format!("Invalid price on line {}", line_num + 1))?;

        if !(close.is_finite() && close > 0.0) {
            bail!("Non-positive price on line {}", line_num + 1);
        }

        if let Some(prev) = points.last() {
            if date <= prev.date {
                bail!(
                    "Line {}: date {} does not follow {}",
                    line_num + 1,
                    date,
                    prev.date
                );
            }
        }

        points.push(PricePoint::new(date, close));
    }

    if points.is_empty() {
        bail!("No valid price data found in '{}'", path.display());
    }

    Ok(PriceSeries::new(points))
}

/// Days of `series` inside the inclusive range `[start, end]`.
pub fn select_date_range(series: &PriceSeries, start: NaiveDate, end: NaiveDate) -> PriceSeries {
    series
        .points()
        .iter()
        .filter(|p| p.date >= start && p.date <= end)
        .copied()
        .collect()
}
