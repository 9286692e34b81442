//! Record: one row of the price file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV row for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}
