//! Filter criteria: selected symbols plus an inclusive date interval.

use super::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which rows a view keeps.
///
/// An empty symbol set matches nothing. `start > end` is a valid, empty interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub symbols: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterCriteria {
    pub fn new<I, S>(symbols: I, start: NaiveDate, end: NaiveDate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            start,
            end,
        }
    }

    /// Membership and interval test for a single record.
    pub fn matches(&self, record: &Record) -> bool {
        self.start <= record.date
            && record.date <= self.end
            && self.symbols.contains(&record.symbol)
    }

    /// True when no record can possibly match.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() || self.start > self.end
    }
}
