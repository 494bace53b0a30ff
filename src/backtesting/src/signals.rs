//! Signal generation module for moving average crossover strategy.

use finance_tools::{ensure_aligned, MovingAverageSeries, Result};
use log::debug;

use crate::models::{Signal, SignalPoint, SignalState, TradeSide, Transition};

/// Derive a LONG/FLAT signal from a short and a long moving average.
///
/// A day is LONG only when the short average is strictly above the long one;
/// ties are FLAT. Both series must share the same date index.
pub fn generate_signal(
    short_ma: &MovingAverageSeries,
    long_ma: &MovingAverageSeries,
) -> Result<Signal> {
    ensure_aligned(short_ma.dates(), long_ma.dates())?;

    let points: Vec<SignalPoint> = short_ma
        .points()
        .iter()
        .zip(long_ma.points())
        .map(|(short, long)| SignalPoint {
            date: short.date,
            state: if short.value > long.value {
                SignalState::Long
            } else {
                SignalState::Flat
            },
        })
        .collect();

    let signal = Signal::new(points);
    debug!(
        "signal {}/{}: {} of {} days long",
        short_ma.window(),
        long_ma.window(),
        signal.long_count(),
        signal.len()
    );
    Ok(signal)
}

/// List every day whose state differs from the previous day's.
///
/// The first day has no predecessor and is never a transition.
pub fn detect_transitions(signal: &Signal) -> Vec<Transition> {
    signal
        .points()
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let side = match (pair[0].state, pair[1].state) {
                (SignalState::Flat, SignalState::Long) => TradeSide::Buy,
                (SignalState::Long, SignalState::Flat) => TradeSide::Sell,
                _ => return None,
            };
            Some(Transition {
                index: i + 1,
                date: pair[1].date,
                side,
            })
        })
        .collect()
}
