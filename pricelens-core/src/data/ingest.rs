//! CSV ingestion: file → polars `DataFrame` → `Dataset`.
//!
//! The reader keeps only the required columns, so the leading index column and
//! anything else the exporter added are discarded. `Date` is normalized to a
//! calendar date; a single unparseable value fails the whole load.

use super::schema::{self, PriceSchema, SchemaError};
use crate::domain::{Dataset, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows sampled for type inference of columns outside the price schema.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Date layouts accepted in the `Date` column.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Errors raised while loading a price file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unparseable {column} value {value:?} at data row {row}")]
    Format {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("CSV parse failed: {0}")]
    Polars(String),
}

impl DataError {
    fn polars(e: PolarsError) -> Self {
        DataError::Polars(e.to_string())
    }

    fn io(path: &Path, source: io::Error) -> Self {
        DataError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load a price file into an immutable `Dataset`, preserving file row order.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DataError> {
    let path = path.as_ref();

    // Surface missing/unreadable files as I/O errors before polars sees them.
    let meta = std::fs::metadata(path).map_err(|e| DataError::io(path, e))?;
    if !meta.is_file() {
        return Err(DataError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    File::open(path).map_err(|e| DataError::io(path, e))?;

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_schema_modify(pin_price_dtypes)
        .and_then(|reader| reader.finish())
        .and_then(|lf| lf.collect())
        .map_err(DataError::polars)?;

    let dropped = df
        .get_column_names()
        .iter()
        .filter(|name| PriceSchema::is_index_column(name.as_str()))
        .count();
    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        index_columns = dropped,
        "read price file"
    );

    let dataset = dataframe_to_dataset(&df)?;
    tracing::debug!(
        path = %path.display(),
        records = dataset.len(),
        symbols = dataset.symbols().len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Fix the dtypes of the price columns instead of trusting inference.
///
/// Text columns stay text so `Date` always goes through `parse_date`; numeric
/// columns are read as `Float64` so a late decimal cannot fail the scan.
/// Absent columns are left alone and reported by `PriceSchema::validate`.
fn pin_price_dtypes(mut inferred: Schema) -> PolarsResult<Schema> {
    let pinned = [schema::SYMBOL, schema::DATE]
        .into_iter()
        .map(|name| (name, DataType::String))
        .chain(
            PriceSchema::NUMERIC_COLUMNS
                .into_iter()
                .map(|name| (name, DataType::Float64)),
        );
    for (name, dtype) in pinned {
        if let Some(slot) = inferred.try_get_mut(name).ok() {
            *slot = dtype;
        }
    }
    Ok(inferred)
}

/// Convert a raw price `DataFrame` into records.
pub fn dataframe_to_dataset(df: &DataFrame) -> Result<Dataset, DataError> {
    PriceSchema::validate(df)?;

    let dates = normalize_dates(df.column(schema::DATE).map_err(DataError::polars)?)?;

    let symbol_col = df
        .column(schema::SYMBOL)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(DataError::polars)?;
    let symbol_ca = symbol_col.str().map_err(DataError::polars)?;

    let float_column = |name: &str| -> Result<Column, DataError> {
        df.column(name)
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(DataError::polars)
    };
    let open_col = float_column(schema::OPEN)?;
    let close_col = float_column(schema::CLOSE)?;
    let high_col = float_column(schema::HIGH)?;
    let low_col = float_column(schema::LOW)?;
    let volume_col = df
        .column(schema::VOLUME)
        .and_then(|c| c.cast(&DataType::UInt64))
        .map_err(DataError::polars)?;

    let open_ca = open_col.f64().map_err(DataError::polars)?;
    let close_ca = close_col.f64().map_err(DataError::polars)?;
    let high_ca = high_col.f64().map_err(DataError::polars)?;
    let low_ca = low_col.f64().map_err(DataError::polars)?;
    let volume_ca = volume_col.u64().map_err(DataError::polars)?;

    dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let symbol = symbol_ca
                .get(i)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| DataError::Format {
                    row: i + 1,
                    column: schema::SYMBOL,
                    value: symbol_ca.get(i).unwrap_or("<null>").to_string(),
                })?;
            Ok(Record {
                symbol: symbol.to_string(),
                date,
                open: open_ca.get(i).unwrap_or(f64::NAN),
                close: close_ca.get(i).unwrap_or(f64::NAN),
                high: high_ca.get(i).unwrap_or(f64::NAN),
                low: low_ca.get(i).unwrap_or(f64::NAN),
                volume: volume_ca.get(i).unwrap_or(0),
            })
        })
        .collect()
}

/// Turn the `Date` column into calendar dates.
///
/// Native `Date`/`Datetime` columns are converted directly. Anything else is
/// read as text and parsed cell by cell, so a numeric `20210104` is a format
/// error rather than a day offset.
fn normalize_dates(column: &Column) -> Result<Vec<NaiveDate>, DataError> {
    let n = column.len();
    let null_date = |row: usize| DataError::Format {
        row,
        column: schema::DATE,
        value: "<null>".to_string(),
    };

    if matches!(column.dtype(), DataType::Date | DataType::Datetime(_, _)) {
        let as_date = column.cast(&DataType::Date).map_err(DataError::polars)?;
        let ca = as_date.date().map_err(DataError::polars)?;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

        let mut dates = Vec::with_capacity(n);
        for i in 0..n {
            let days = ca.get(i).ok_or_else(|| null_date(i + 1))?;
            dates.push(epoch + chrono::Duration::days(days as i64));
        }
        return Ok(dates);
    }

    let text = column.cast(&DataType::String).map_err(DataError::polars)?;
    let ca = text.str().map_err(DataError::polars)?;
    let mut dates = Vec::with_capacity(n);
    for i in 0..n {
        let raw = ca.get(i).ok_or_else(|| null_date(i + 1))?;
        let date = parse_date(raw).ok_or_else(|| DataError::Format {
            row: i + 1,
            column: schema::DATE,
            value: raw.to_string(),
        })?;
        dates.push(date);
    }
    Ok(dates)
}

/// Parse a single `Date` cell. Time-of-day and offsets are dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
