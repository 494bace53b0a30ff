//! Shared market data model for the crossover study.
//!
//! Every series in the workspace is an ordered, immutable sequence keyed by
//! trading date. Components that combine two series check that both share
//! the same date index with [`ensure_aligned`] before doing any arithmetic.

pub mod error;
pub mod price;
pub mod series;

pub use error::{FinanceError, Result};
pub use price::{PricePoint, PriceSeries};
pub use series::{MovingAverageSeries, SeriesPoint};

use chrono::NaiveDate;

/// Check that two date indexes are identical, point for point.
///
/// Fails with [`FinanceError::MisalignedSeries`] on a length mismatch or on
/// the first index where the dates differ.
pub fn ensure_aligned<L, R>(left: L, right: R) -> Result<()>
where
    L: ExactSizeIterator<Item = NaiveDate>,
    R: ExactSizeIterator<Item = NaiveDate>,
{
    let left_len = left.len();
    let right_len = right.len();

    if left_len != right_len {
        return Err(FinanceError::MisalignedSeries {
            left_len,
            right_len,
            index: left_len.min(right_len),
        });
    }

    match left.zip(right).position(|(a, b)| a != b) {
        Some(index) => Err(FinanceError::MisalignedSeries {
            left_len,
            right_len,
            index,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_aligned_dates() {
        let a = vec![day(1), day(2), day(3)];
        let b = a.clone();
        assert!(ensure_aligned(a.into_iter(), b.into_iter()).is_ok());
    }

    #[test]
    fn test_empty_indexes_are_aligned() {
        let a: Vec<NaiveDate> = Vec::new();
        assert!(ensure_aligned(a.clone().into_iter(), a.into_iter()).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let a = vec![day(1), day(2), day(3)];
        let b = vec![day(1), day(2)];
        let err = ensure_aligned(a.into_iter(), b.into_iter()).unwrap_err();
        assert_eq!(
            err,
            FinanceError::MisalignedSeries {
                left_len: 3,
                right_len: 2,
                index: 2
            }
        );
    }

    #[test]
    fn test_date_mismatch_reports_first_index() {
        let a = vec![day(1), day(2), day(3)];
        let b = vec![day(1), day(5), day(6)];
        match ensure_aligned(a.into_iter(), b.into_iter()) {
            Err(FinanceError::MisalignedSeries { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected misalignment, got {:?}", other),
        }
    }
}
