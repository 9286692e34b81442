//! Domain types for PriceLens

pub mod criteria;
pub mod dataset;
pub mod record;

pub use criteria::FilterCriteria;
pub use dataset::Dataset;
pub use record::Record;
