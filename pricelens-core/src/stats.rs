//! Grouped descriptive statistics: count, mean, std, min, quartiles, max per
//! symbol for each OHLCV field.

use crate::domain::{Dataset, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one numeric column.
///
/// `count` excludes NaN values. Every statistic is `None` when `count == 0`;
/// `std` (sample, ddof = 1) is also `None` when `count < 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let mean = mean_f64(&sorted);
        Self {
            count: sorted.len(),
            mean: Some(mean),
            std: sample_std(&sorted, mean),
            min: sorted.first().copied(),
            q25: Some(quantile_sorted(&sorted, 0.25)),
            median: Some(quantile_sorted(&sorted, 0.5)),
            q75: Some(quantile_sorted(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }

    /// Every statistic rounded to `places` decimals, ties to even.
    pub fn rounded(&self, places: u32) -> Self {
        let factor = 10f64.powi(places as i32);
        let round = |v: Option<f64>| v.map(|x| (x * factor).round_ties_even() / factor);
        Self {
            count: self.count,
            mean: round(self.mean),
            std: round(self.std),
            min: round(self.min),
            q25: round(self.q25),
            median: round(self.median),
            q75: round(self.q75),
            max: round(self.max),
        }
    }
}

/// Describe blocks for each field of one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub open: Describe,
    pub close: Describe,
    pub high: Describe,
    pub low: Describe,
    pub volume: Describe,
}

impl SymbolStats {
    fn from_records(records: &[&Record]) -> Self {
        Self {
            open: Describe::from_values(records.iter().map(|r| r.open)),
            close: Describe::from_values(records.iter().map(|r| r.close)),
            high: Describe::from_values(records.iter().map(|r| r.high)),
            low: Describe::from_values(records.iter().map(|r| r.low)),
            volume: Describe::from_values(records.iter().map(|r| r.volume as f64)),
        }
    }

    /// `(field name, describe)` pairs in display order.
    pub fn fields(&self) -> [(&'static str, &Describe); 5] {
        [
            ("Open", &self.open),
            ("Close", &self.close),
            ("High", &self.high),
            ("Low", &self.low),
            ("Volume", &self.volume),
        ]
    }

    pub fn rounded(&self, places: u32) -> Self {
        Self {
            open: self.open.rounded(places),
            close: self.close.rounded(places),
            high: self.high.rounded(places),
            low: self.low.rounded(places),
            volume: self.volume.rounded(places),
        }
    }
}

/// Per-symbol statistics, keyed (and ordered) by symbol.
pub fn summarize(dataset: &Dataset) -> BTreeMap<String, SymbolStats> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in dataset {
        groups.entry(record.symbol.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(symbol, records)| (symbol.to_string(), SymbolStats::from_records(&records)))
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
