//! Data ingestion and caching

pub mod cache;
pub mod ingest;
pub mod schema;

pub use cache::{DatasetCache, FileIdentity};
pub use ingest::{load, DataError};
pub use schema::{PriceSchema, SchemaError};
