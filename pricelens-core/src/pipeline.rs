//! Filter and moving-average stages.
//!
//! Every stage borrows its input and returns a fresh value; the source
//! `Dataset` is never touched.

use crate::domain::{Dataset, FilterCriteria, Record};
use crate::indicators::{Indicator, Sma};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("moving-average window must be at least 1, got {0}")]
    InvalidWindow(usize),
}

/// Rows matching `criteria`, in source order.
///
/// An empty symbol set or an inverted interval yields an empty dataset.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    if criteria.is_empty() {
        return Dataset::default();
    }
    let filtered: Dataset = dataset
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();
    tracing::debug!(
        source = dataset.len(),
        kept = filtered.len(),
        symbols = criteria.symbols.len(),
        "filtered dataset"
    );
    filtered
}

/// One row of a derived view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(flatten)]
    pub record: Record,
    pub moving_average: Option<f64>,
}

/// A dataset with an optional per-row moving average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedView {
    rows: Vec<ViewRow>,
    window: Option<usize>,
}

impl DerivedView {
    /// Wrap a dataset without computing anything.
    pub fn plain(dataset: &Dataset) -> Self {
        Self {
            rows: dataset
                .iter()
                .map(|record| ViewRow {
                    record: record.clone(),
                    moving_average: None,
                })
                .collect(),
            window: None,
        }
    }

    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Window the moving average was computed with, if any.
    pub fn window(&self) -> Option<usize> {
        self.window
    }

    /// Rows newest first; equal dates keep source order.
    pub fn sorted_by_date_desc(&self) -> Vec<&ViewRow> {
        let mut rows: Vec<&ViewRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.record.date.cmp(&a.record.date));
        rows
    }

    /// The underlying records, dropping derived values.
    pub fn to_dataset(&self) -> Dataset {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }
}

/// Attach a trailing mean of Close over `window` records to every row.
///
/// Rows are grouped by symbol and ordered by date within each group; output
/// keeps the input row order. Rows before the window fills, and rows whose
/// window contains a NaN close, get `None`.
pub fn with_moving_average(dataset: &Dataset, window: usize) -> Result<DerivedView, PipelineError> {
    let sma = Sma::new(window).ok_or(PipelineError::InvalidWindow(window))?;
    let records = dataset.records();

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        groups.entry(record.symbol.as_str()).or_default().push(i);
    }

    let mut averages: Vec<Option<f64>> = vec![None; records.len()];
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| records[i].date);
        let ordered: Vec<Record> = indices.iter().map(|&i| records[i].clone()).collect();
        let values = sma.compute(&ordered);
        for (&i, value) in indices.iter().zip(values) {
            averages[i] = (!value.is_nan()).then_some(value);
        }
    }

    tracing::debug!(
        indicator = sma.name(),
        rows = records.len(),
        symbols = groups.len(),
        "computed moving average"
    );

    Ok(DerivedView {
        rows: records
            .iter()
            .zip(averages)
            .map(|(record, moving_average)| ViewRow {
                record: record.clone(),
                moving_average,
            })
            .collect(),
        window: Some(window),
    })
}

/// The dashboard flow: filter, then optionally attach a moving average.
pub fn build_view(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    ma_window: Option<usize>,
) -> Result<DerivedView, PipelineError> {
    let filtered = filter(dataset, criteria);
    match ma_window {
        Some(window) => with_moving_average(&filtered, window),
        None => Ok(DerivedView::plain(&filtered)),
    }
}
