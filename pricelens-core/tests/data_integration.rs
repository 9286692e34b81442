//! End-to-end tests: CSV on disk → dataset → view → statistics.

use chrono::NaiveDate;
use pricelens_core::data::{DataError, DatasetCache, SchemaError};
use pricelens_core::{
    build_view, chart_series, load, summarize, DashboardConfig, FilterCriteria, Measure,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/prices.csv")
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn fixture_loads_with_index_column_dropped() {
    let dataset = load(fixture()).unwrap();

    assert_eq!(dataset.len(), 30);
    assert_eq!(dataset.symbols(), vec!["AAPL", "MSFT", "TSLA"]);
    assert_eq!(dataset.date_range(), Some((ymd(2021, 1, 4), ymd(2021, 1, 13))));

    let first = &dataset.records()[0];
    assert_eq!(first.symbol, "AAPL");
    assert_eq!(first.date, ymd(2021, 1, 4));
    assert_eq!(first.close, 129.66);
    assert_eq!(first.volume, 1_000_065);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, DataError::Io { .. }), "unexpected: {err}");
}

#[test]
fn unparseable_date_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "bad_date.csv",
        ",Symbol,Date,Open,Close,High,Low,Volume\n\
         0,AAPL,2021-01-04,1,2,3,0.5,10\n\
         1,AAPL,04-Jan-2021x,1,2,3,0.5,10\n",
    );

    let err = load(&path).unwrap_err();
    match err {
        DataError::Format { row, column, value } => {
            assert_eq!(row, 2);
            assert_eq!(column, "Date");
            assert_eq!(value, "04-Jan-2021x");
        }
        other => panic!("expected format error, got {other}"),
    }
}

#[test]
fn directory_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path()).unwrap_err();
    assert!(matches!(err, DataError::Io { .. }), "unexpected: {err}");
}

#[test]
fn integer_date_column_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "int_date.csv",
        ",Symbol,Date,Open,Close,High,Low,Volume\n\
         0,AAPL,20210104,1,2,3,0.5,10\n",
    );

    let err = load(&path).unwrap_err();
    assert!(
        matches!(err, DataError::Format { row: 1, column: "Date", ref value } if value == "20210104"),
        "unexpected: {err}"
    );
}

#[test]
fn null_date_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "null_date.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04,1,2,3,0.5,10\n\
         AAPL,,1,2,3,0.5,10\n",
    );

    let err = load(&path).unwrap_err();
    assert!(
        matches!(err, DataError::Format { row: 2, column: "Date", .. }),
        "unexpected: {err}"
    );
}

#[test]
fn null_symbol_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "null_symbol.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04,1,2,3,0.5,10\n\
         ,2021-01-05,1,2,3,0.5,10\n",
    );

    let err = load(&path).unwrap_err();
    assert!(
        matches!(err, DataError::Format { row: 2, column: "Symbol", .. }),
        "unexpected: {err}"
    );
}

#[test]
fn null_price_is_nan_and_null_volume_is_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "nulls.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04,1,,3,0.5,10\n\
         AAPL,2021-01-05,1,2,3,0.5,\n",
    );

    let dataset = load(&path).unwrap();
    let records = dataset.records();
    assert!(records[0].close.is_nan());
    assert_eq!(records[0].open, 1.0);
    assert_eq!(records[0].volume, 10);
    assert_eq!(records[1].close, 2.0);
    assert_eq!(records[1].volume, 0);
}

#[test]
fn timestamp_dates_load_as_calendar_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "timestamps.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04T16:00:00,1,2,3,0.5,10\n\
         AAPL,2021-01-05T16:00:00-05:00,1,2,3,0.5,10\n\
         AAPL,01/06/2021,1,2,3,0.5,10\n",
    );

    let dataset = load(&path).unwrap();
    let dates: Vec<NaiveDate> = dataset.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2021, 1, 4), ymd(2021, 1, 5), ymd(2021, 1, 6)]);
}

#[test]
fn fractional_volume_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "float_volume.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04,1,2,3,0.5,1500.0\n\
         AAPL,2021-01-05,1,2,3,0.5,1234.9\n",
    );

    let dataset = load(&path).unwrap();
    assert_eq!(dataset.records()[0].volume, 1500);
    assert_eq!(dataset.records()[1].volume, 1234);
}

#[test]
fn late_decimals_beyond_inference_window_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::from(",Symbol,Date,Open,Close,High,Low,Volume\n");
    let base = ymd(2000, 1, 1);
    for i in 0..10_050usize {
        let date = base + chrono::Duration::days(i as i64);
        let (close, volume) = if i == 10_020 {
            ("101.25".to_string(), "1234.5".to_string())
        } else {
            ((100 + i % 7).to_string(), (1000 + i).to_string())
        };
        content.push_str(&format!("{i},AAPL,{date},100,{close},110,90,{volume}\n"));
    }
    let path = write_file(dir.path(), "long.csv", &content);

    let dataset = load(&path).unwrap();
    assert_eq!(dataset.len(), 10_050);
    let late = &dataset.records()[10_020];
    assert_eq!(late.close, 101.25);
    assert_eq!(late.volume, 1234);
    assert_eq!(dataset.records()[10_049].volume, 11_049);
}

#[test]
fn missing_column_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "no_volume.csv",
        "Symbol,Date,Open,Close,High,Low\nAAPL,2021-01-04,1,2,3,0.5\n",
    );

    let err = load(&path).unwrap_err();
    assert!(
        matches!(err, DataError::Schema(SchemaError::MissingColumn(ref c)) if c == "Volume"),
        "unexpected: {err}"
    );
}

#[test]
fn file_without_index_column_also_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "plain.csv",
        "Symbol,Date,Open,Close,High,Low,Volume\n\
         AAPL,2021-01-04 00:00:00,1,2,3,0.5,10\n\
         MSFT,2021-01-05 00:00:00,4,5,6,3.5,20\n",
    );

    let dataset = load(&path).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[1].date, ymd(2021, 1, 5));
    assert_eq!(dataset.records()[1].close, 5.0);
}

#[test]
fn view_stats_and_chart_from_fixture() {
    let dataset = load(fixture()).unwrap();
    let criteria = FilterCriteria::new(["AAPL", "TSLA"], ymd(2021, 1, 6), ymd(2021, 1, 10));

    let view = build_view(&dataset, &criteria, Some(3)).unwrap();
    assert_eq!(view.len(), 10);
    assert!(view.rows().iter().all(|r| criteria.matches(&r.record)));

    // Two warmup rows per symbol, three valued rows per symbol.
    let valued = view.rows().iter().filter(|r| r.moving_average.is_some()).count();
    assert_eq!(valued, 6);

    let stats = summarize(&view.to_dataset());
    let keys: Vec<&str> = stats.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["AAPL", "TSLA"]);
    assert_eq!(stats["AAPL"].close.count, 5);

    let series = chart_series(&view, Measure::for_view(&view));
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].points.len(), 3);
    assert_eq!(series[0].points[0].0, ymd(2021, 1, 8));
}

#[test]
fn config_drives_the_same_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture(), dir.path().join("prices.csv")).unwrap();
    let config_path = write_file(
        dir.path(),
        "dashboard.toml",
        "[data]\npath = \"prices.csv\"\n\n[moving_average]\nenabled = true\nwindow = 5\n",
    );

    let config = DashboardConfig::from_file(&config_path).unwrap();
    let dataset = load(&config.data.path).unwrap();
    let criteria = config.resolve_criteria(&dataset).unwrap();

    let view = build_view(&dataset, &criteria, config.ma_window()).unwrap();
    assert_eq!(view.len(), 10);
    assert!(view.rows().iter().all(|r| r.record.symbol == "AAPL"));
    assert_eq!(view.rows().iter().filter(|r| r.moving_average.is_some()).count(), 6);
}

#[test]
fn global_cache_reuses_dataset() {
    let first = DatasetCache::global().load(fixture()).unwrap();
    let second = DatasetCache::global().load(fixture()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.fingerprint(), load(fixture()).unwrap().fingerprint());
}
