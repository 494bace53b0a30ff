use chrono::{DateTime, NaiveDate, Utc};
use finance_tools::{PricePoint, PriceSeries};
use std::collections::BTreeMap;

use crate::error::{Result, StreamerError};

pub const DAY_MILLIS: i64 = 86_400_000;

/// One OHLC bar as returned by `/v5/market/kline`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kline {
    /// Bar open time, milliseconds since the epoch (UTC).
    pub start_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Kline {
    /// Parse the string array Bybit sends per bar:
    /// `[startTime, open, high, low, close, volume, turnover]`.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() < 5 {
            return Err(StreamerError::MalformedKline(format!(
                "expected at least 5 fields, got {}",
                fields.len()
            )));
        }

        let number = |i: usize| -> Result<f64> {
            fields[i].parse::<f64>().map_err(|_| {
                StreamerError::MalformedKline(format!("field {} is not a number: {}", i, fields[i]))
            })
        };

        let start_ms = fields[0].parse::<i64>().map_err(|_| {
            StreamerError::MalformedKline(format!("bad timestamp: {}", fields[0]))
        })?;

        Ok(Self {
            start_ms,
            open: number(1)?,
            high: number(2)?,
            low: number(3)?,
            close: number(4)?,
        })
    }

    /// Trading day of the bar (UTC).
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(self.start_ms).map(|dt| dt.date_naive())
    }

    /// Line in the `YYYYMMDD open high low close` history format.
    pub fn to_line(&self) -> Option<String> {
        self.date().map(|date| {
            format!(
                "{} {} {} {} {}",
                date.format("%Y%m%d"),
                self.open,
                self.high,
                self.low,
                self.close
            )
        })
    }
}

/// Midnight UTC of `date` in epoch milliseconds.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Keep bars inside `[start, end]`, drop duplicate days and sort ascending.
pub fn select_range(klines: &[Kline], start: NaiveDate, end: NaiveDate) -> Vec<Kline> {
    let mut by_day: BTreeMap<NaiveDate, Kline> = BTreeMap::new();
    for kline in klines {
        if let Some(date) = kline.date() {
            if date >= start && date <= end {
                by_day.entry(date).or_insert(*kline);
            }
        }
    }
    by_day.into_values().collect()
}

/// Closing prices of ascending bars as a [`PriceSeries`].
pub fn klines_to_series(klines: &[Kline]) -> PriceSeries {
    klines
        .iter()
        .filter_map(|k| k.date().map(|date| PricePoint::new(date, k.close)))
        .collect()
}
