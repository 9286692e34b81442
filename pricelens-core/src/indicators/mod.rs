//! Rolling indicators over a single symbol's records.
//!
//! Indicators are pure functions: date-ordered records in, numeric series out.
//! The output has the same length as the input and holds `f64::NAN` wherever
//! the indicator has no value (warmup, or a NaN inside the window).

pub mod sma;

pub use sma::Sma;

use crate::domain::Record;

/// A per-record series derived from one symbol's history.
///
/// Callers must pass records of a single symbol, sorted by date ascending.
/// No value at index t may depend on records after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of records needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole series.
    fn compute(&self, records: &[Record]) -> Vec<f64>;
}

/// Build single-symbol records from close prices for testing.
#[cfg(test)]
pub fn make_records(closes: &[f64]) -> Vec<Record> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Record {
            symbol: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open: close,
            close,
            high: close + 1.0,
            low: close - 1.0,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
