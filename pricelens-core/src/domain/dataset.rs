//! Dataset: the immutable, ordered collection of records loaded from one file.

use super::criteria::FilterCriteria;
use super::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered sequence of records.
///
/// There are no mutating accessors: every pipeline stage builds a new `Dataset`
/// (or a `DerivedView`) and leaves its input untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct symbols in order of first appearance.
    pub fn symbols(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.symbol.as_str()))
            .map(|r| r.symbol.as_str())
            .collect()
    }

    /// Earliest and latest date across all records.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// First symbol over the full date range: the initial dashboard selection.
    pub fn default_criteria(&self) -> Option<FilterCriteria> {
        let (start, end) = self.date_range()?;
        let first = self.symbols().first().map(|s| s.to_string())?;
        Some(FilterCriteria::new([first], start, end))
    }

    /// Deterministic BLAKE3 digest over every record, in file order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for record in &self.records {
            hasher.update(record.symbol.as_bytes());
            hasher.update(record.date.to_string().as_bytes());
            hasher.update(&record.open.to_le_bytes());
            hasher.update(&record.close.to_le_bytes());
            hasher.update(&record.high.to_le_bytes());
            hasher.update(&record.low.to_le_bytes());
            hasher.update(&record.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
