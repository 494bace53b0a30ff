use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Closing price of one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes in ascending date order.
///
/// Ordering and uniqueness of dates are the provider's responsibility; the
/// series itself does not re-check them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + Duration::days(i as i64), close))
            .collect()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl ExactSizeIterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Lowest and highest close, `None` for an empty series.
    pub fn close_range(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let min = self.points.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|p| p.close).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
