use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Market exposure implied by the moving averages on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    Long,
    Flat,
}

impl SignalState {
    /// 0/1 encoding: 1 = LONG, 0 = FLAT.
    pub fn as_binary(self) -> u8 {
        match self {
            SignalState::Long => 1,
            SignalState::Flat => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub state: SignalState,
}

/// One LONG/FLAT state per price point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    points: Vec<SignalPoint>,
}

impl Signal {
    pub fn new(points: Vec<SignalPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<SignalState> {
        self.points.get(index).map(|p| p.state)
    }

    pub fn dates(&self) -> impl ExactSizeIterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn states(&self) -> Vec<SignalState> {
        self.points.iter().map(|p| p.state).collect()
    }

    pub fn as_binary(&self) -> Vec<u8> {
        self.points.iter().map(|p| p.state.as_binary()).collect()
    }

    /// Number of days the strategy is invested.
    pub fn long_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.state == SignalState::Long)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A change of signal state: FLAT -> LONG is a BUY, LONG -> FLAT a SELL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Position in the price series, always >= 1.
    pub index: usize,
    pub date: NaiveDate,
    pub side: TradeSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub strategy_value: f64,
    pub baseline_value: f64,
}

/// Strategy and buy-and-hold portfolio values, one point per price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    initial_balance: f64,
    points: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn new(initial_balance: f64, points: Vec<EquityPoint>) -> Self {
        Self {
            initial_balance,
            points,
        }
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn points(&self) -> &[EquityPoint] {
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

    pub fn strategy_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.strategy_value).collect()
    }

    pub fn baseline_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.baseline_value).collect()
    }

    /// Last strategy value, or the initial balance when nothing was simulated.
    pub fn final_strategy_value(&self) -> f64 {
        self.points
            .last()
            .map_or(self.initial_balance, |p| p.strategy_value)
    }

    /// Last buy-and-hold value, or the initial balance when nothing was simulated.
    pub fn final_baseline_value(&self) -> f64 {
        self.points
            .last()
            .map_or(self.initial_balance, |p| p.baseline_value)
    }
}
