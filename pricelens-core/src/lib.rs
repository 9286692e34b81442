//! PriceLens Core: the data pipeline behind a stock price dashboard.
//!
//! - Domain types (records, datasets, filter criteria)
//! - CSV ingestion with date normalization, plus a file-identity dataset cache
//! - Symbol/date filtering and per-symbol moving averages
//! - Grouped descriptive statistics
//! - Chart series extraction
//! - TOML dashboard configuration

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod stats;

pub use chart::{chart_series, Measure, Series};
pub use config::{ConfigError, DashboardConfig};
pub use data::{load, DataError, DatasetCache};
pub use domain::{Dataset, FilterCriteria, Record};
pub use pipeline::{build_view, filter, with_moving_average, DerivedView, PipelineError, ViewRow};
pub use stats::{summarize, Describe, SymbolStats};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the cached dataset and views can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Dataset>();
        require_sync::<Dataset>();
        require_send::<DerivedView>();
        require_sync::<DerivedView>();
        require_sync::<DatasetCache>();
        require_send::<SymbolStats>();
        require_sync::<SymbolStats>();
    }
}
