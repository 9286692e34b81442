//! Line-chart series: one line per symbol, x = date, y = close or moving average.

use crate::pipeline::{DerivedView, ViewRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which value a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Close,
    MovingAverage,
}

impl Measure {
    /// Moving average when the view carries one, close otherwise.
    pub fn for_view(view: &DerivedView) -> Self {
        if view.window().is_some() {
            Measure::MovingAverage
        } else {
            Measure::Close
        }
    }

    fn value(self, row: &ViewRow) -> Option<f64> {
        match self {
            Measure::Close => Some(row.record.close).filter(|v| !v.is_nan()),
            Measure::MovingAverage => row.moving_average,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Series per symbol in first-appearance order, points sorted by date.
///
/// Rows without a value for `measure` are skipped; a symbol with no points
/// still gets an (empty) series.
pub fn chart_series(view: &DerivedView, measure: Measure) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for row in view.rows() {
        let slot = *slots.entry(row.record.symbol.as_str()).or_insert_with(|| {
            series.push(Series {
                symbol: row.record.symbol.clone(),
                points: Vec::new(),
            });
            series.len() - 1
        });
        if let Some(value) = measure.value(row) {
            series[slot].points.push((row.record.date, value));
        }
    }

    for s in &mut series {
        s.points.sort_by_key(|(date, _)| *date);
    }
    series
}
