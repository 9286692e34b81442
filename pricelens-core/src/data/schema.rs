use polars::prelude::*;

/// Column names of the price file, as written by the upstream exporter.
pub const SYMBOL: &str = "Symbol";
pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const CLOSE: &str = "Close";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const VOLUME: &str = "Volume";

/// Expected layout of a price file.
///
/// The file usually carries a leading unnamed index column as well; it is not
/// part of the schema and is dropped on load.
pub struct PriceSchema;

impl PriceSchema {
    /// Columns every price file must carry.
    pub const REQUIRED: [&'static str; 7] = [SYMBOL, DATE, OPEN, CLOSE, HIGH, LOW, VOLUME];

    /// Numeric columns, read as `Float64` whatever the first rows suggest.
    pub const NUMERIC_COLUMNS: [&'static str; 5] = [OPEN, CLOSE, HIGH, LOW, VOLUME];

    /// True for the pandas-style index column (`""` or `Unnamed: 0`).
    pub fn is_index_column(name: &str) -> bool {
        let trimmed = name.trim();
        trimmed.is_empty() || trimmed.starts_with("Unnamed")
    }

    /// Validate that all required columns exist.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let actual = df.get_column_names();
        for required in Self::REQUIRED {
            if !actual.iter().any(|name| name.as_str() == required) {
                return Err(SchemaError::MissingColumn(required.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}
