//! Simple Moving Average (SMA) of Close.
//!
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::Record;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Returns `None` for a zero period.
    pub fn new(period: usize) -> Option<Self> {
        if period == 0 {
            return None;
        }
        Some(Self {
            period,
            name: format!("sma_{period}"),
        })
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, records: &[Record]) -> Vec<f64> {
        let n = records.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let window_sum = |end: usize| -> (f64, bool) {
            records[(end + 1 - self.period)..=end]
                .iter()
                .fold((0.0, false), |(sum, nan), r| (sum + r.close, nan || r.close.is_nan()))
        };

        let (mut sum, mut nan_in_window) = window_sum(self.period - 1);
        if !nan_in_window {
            result[self.period - 1] = sum / self.period as f64;
        }

        for i in self.period..n {
            let leaving = records[i - self.period].close;
            let entering = records[i].close;

            // A NaN poisons the running sum; rescan the window until it leaves.
            if entering.is_nan() || leaving.is_nan() || nan_in_window {
                (sum, nan_in_window) = window_sum(i);
                if nan_in_window {
                    continue;
                }
            } else {
                sum = sum - leaving + entering;
            }

            result[i] = sum / self.period as f64;
        }

        result
    }
}
