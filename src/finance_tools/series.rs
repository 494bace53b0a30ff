use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Rolling mean of a price series, aligned 1:1 with its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    window: usize,
    points: Vec<SeriesPoint>,
}

impl MovingAverageSeries {
    pub fn new(window: usize, points: Vec<SeriesPoint>) -> Self {
        Self { window, points }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.value)
    }

    pub fn dates(&self) -> impl ExactSizeIterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
