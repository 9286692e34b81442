//! PriceLens CLI: inspect a stock price CSV the way the dashboard does.
//!
//! Commands:
//! - `symbols`: list symbols, row counts and the covered date range
//! - `view`: filtered rows, newest first, with an optional moving average
//! - `stats`: per-symbol describe table for Open/Close/High/Low/Volume
//! - `chart`: per-symbol line series (close or moving average)

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pricelens_core::stats::SymbolStats;
use pricelens_core::{
    build_view, chart_series, summarize, DashboardConfig, Dataset, DatasetCache, DerivedView,
    FilterCriteria, Measure, Series,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Decimal places used for statistics output.
const STATS_PRECISION: u32 = 2;

#[derive(Parser)]
#[command(
    name = "pricelens",
    about = "PriceLens CLI: filter, average and summarize historical stock prices"
)]
struct Cli {
    /// Log pipeline details to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List symbols and the date range of the file.
    Symbols {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show filtered rows, newest first.
    View {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Moving-average window (records). Overrides the config.
        #[arg(long)]
        ma: Option<usize>,

        /// Show at most this many rows.
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Per-symbol descriptive statistics of the filtered rows.
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Per-symbol line series: close, or the moving average when enabled.
    Chart {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Moving-average window (records). Overrides the config.
        #[arg(long)]
        ma: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Price CSV. Optional when --config names one.
    csv: Option<PathBuf>,

    /// Dashboard TOML config supplying the data path and defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Symbol to include (repeatable). Defaults to the config, else the first symbol.
    #[arg(long = "symbol", short = 's')]
    symbols: Vec<String>,

    /// First date (YYYY-MM-DD), inclusive.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD), inclusive.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Symbols { source } => run_symbols(&source),
        Commands::View {
            source,
            filter,
            ma,
            limit,
            format,
        } => run_view(&source, &filter, ma, limit, format),
        Commands::Stats {
            source,
            filter,
            format,
        } => run_stats(&source, &filter, format),
        Commands::Chart {
            source,
            filter,
            ma,
            format,
        } => run_chart(&source, &filter, ma, format),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

// ── Source / filter resolution ──────────────────────────────────────

/// Config (from file or defaults) plus the dataset it points at.
fn load_source(source: &SourceArgs) -> Result<(DashboardConfig, Arc<Dataset>)> {
    let mut config = match &source.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    match (&source.csv, &source.config) {
        (Some(csv), _) => config.data.path = csv.clone(),
        (None, Some(_)) => {}
        (None, None) => bail!("a CSV path or --config is required"),
    }

    let dataset = DatasetCache::global()
        .load(&config.data.path)
        .with_context(|| format!("Failed to load price data {}", config.data.path.display()))?;
    Ok((config, dataset))
}

/// Config defaults, then command-line overrides.
fn resolve_criteria(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &FilterArgs,
) -> Result<FilterCriteria> {
    let mut criteria = match config.resolve_criteria(dataset) {
        Some(criteria) => criteria,
        None => match (args.start, args.end) {
            (Some(start), Some(end)) => FilterCriteria::new(Vec::<String>::new(), start, end),
            _ => bail!("dataset is empty; pass --start and --end explicitly"),
        },
    };

    if !args.symbols.is_empty() {
        criteria.symbols = args.symbols.iter().cloned().collect();
    }
    if let Some(start) = args.start {
        criteria.start = start;
    }
    if let Some(end) = args.end {
        criteria.end = end;
    }

    let known = dataset.symbols();
    for symbol in &criteria.symbols {
        if !known.contains(&symbol.as_str()) {
            tracing::warn!(symbol = %symbol, "symbol not present in dataset");
        }
    }
    if criteria.start > criteria.end {
        tracing::warn!(start = %criteria.start, end = %criteria.end, "start is after end; view is empty");
    }

    Ok(criteria)
}

fn build(source: &SourceArgs, filter: &FilterArgs, ma: Option<usize>) -> Result<DerivedView> {
    let (config, dataset) = load_source(source)?;
    let criteria = resolve_criteria(&config, &dataset, filter)?;
    let window = ma.or_else(|| config.ma_window());
    Ok(build_view(&dataset, &criteria, window)?)
}

// ── Commands ────────────────────────────────────────────────────────

fn run_symbols(source: &SourceArgs) -> Result<()> {
    let (_, dataset) = load_source(source)?;

    let Some((min, max)) = dataset.date_range() else {
        println!("Dataset is empty.");
        return Ok(());
    };

    println!("Records:     {}", dataset.len());
    println!("Date range:  {min} to {max}");
    println!("Fingerprint: {}", dataset.fingerprint());
    println!();
    println!("{:<10} {:>8}", "Symbol", "Rows");
    println!("{}", "-".repeat(19));
    for symbol in dataset.symbols() {
        let rows = dataset.iter().filter(|r| r.symbol == symbol).count();
        println!("{symbol:<10} {rows:>8}");
    }
    Ok(())
}

#[derive(Serialize)]
struct ViewCsvRow<'a> {
    date: NaiveDate,
    symbol: &'a str,
    open: f64,
    close: f64,
    high: f64,
    low: f64,
    volume: u64,
    moving_average: Option<f64>,
}

fn run_view(
    source: &SourceArgs,
    filter: &FilterArgs,
    ma: Option<usize>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let view = build(source, filter, ma)?;
    let mut rows = view.sorted_by_date_desc();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).context("Failed to serialize view")?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout().lock());
            for row in &rows {
                let r = &row.record;
                writer.serialize(ViewCsvRow {
                    date: r.date,
                    symbol: &r.symbol,
                    open: r.open,
                    close: r.close,
                    high: r.high,
                    low: r.low,
                    volume: r.volume,
                    moving_average: row.moving_average,
                })?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No rows match the selection.");
                return Ok(());
            }
            let ma_header = view.window().map(|w| format!("MA({w})"));
            print!(
                "{:<10} {:<8} {:>10} {:>10} {:>10} {:>10} {:>14}",
                "Date", "Symbol", "Open", "Close", "High", "Low", "Volume"
            );
            if let Some(h) = &ma_header {
                print!(" {h:>10}");
            }
            println!();
            for row in &rows {
                let r = &row.record;
                print!(
                    "{:<10} {:<8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14}",
                    r.date, r.symbol, r.open, r.close, r.high, r.low, r.volume
                );
                if ma_header.is_some() {
                    match row.moving_average {
                        Some(v) => print!(" {v:>10.2}"),
                        None => print!(" {:>10}", "-"),
                    }
                }
                println!();
            }
            println!();
            println!("{} of {} row(s)", rows.len(), view.len());
        }
    }
    Ok(())
}

fn run_stats(source: &SourceArgs, filter: &FilterArgs, format: OutputFormat) -> Result<()> {
    let view = build(source, filter, None)?;
    let stats: BTreeMap<String, SymbolStats> = summarize(&view.to_dataset())
        .into_iter()
        .map(|(symbol, s)| (symbol, s.rounded(STATS_PRECISION)))
        .collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout().lock());
            writer.write_record([
                "symbol", "field", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
            ])?;
            for (symbol, s) in &stats {
                for (field, d) in s.fields() {
                    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
                    writer.write_record([
                        symbol.clone(),
                        field.to_string(),
                        d.count.to_string(),
                        cell(d.mean),
                        cell(d.std),
                        cell(d.min),
                        cell(d.q25),
                        cell(d.median),
                        cell(d.q75),
                        cell(d.max),
                    ])?;
                }
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if stats.is_empty() {
                println!("No rows match the selection.");
                return Ok(());
            }
            for (symbol, s) in &stats {
                print_stats_table(symbol, s);
            }
        }
    }
    Ok(())
}

fn print_stats_table(symbol: &str, stats: &SymbolStats) {
    let fields = stats.fields();
    let fmt = |v: Option<f64>| match v {
        Some(x) => format!("{x:.2}"),
        None => "NaN".to_string(),
    };

    println!("=== {symbol} ===");
    print!("{:<6}", "");
    for (name, _) in &fields {
        print!(" {name:>16}");
    }
    println!();

    let rows: [(&str, fn(&pricelens_core::Describe) -> Option<f64>); 7] = [
        ("mean", |d| d.mean),
        ("std", |d| d.std),
        ("min", |d| d.min),
        ("25%", |d| d.q25),
        ("50%", |d| d.median),
        ("75%", |d| d.q75),
        ("max", |d| d.max),
    ];

    print!("{:<6}", "count");
    for (_, d) in &fields {
        print!(" {:>16}", d.count);
    }
    println!();
    for (label, get) in rows {
        print!("{label:<6}");
        for (_, d) in &fields {
            print!(" {:>16}", fmt(get(d)));
        }
        println!();
    }
    println!();
}

fn run_chart(
    source: &SourceArgs,
    filter: &FilterArgs,
    ma: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let view = build(source, filter, ma)?;
    let measure = Measure::for_view(&view);
    let series = chart_series(&view, measure);

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&series).context("Failed to serialize chart series")?;
            println!("{json}");
        }
        OutputFormat::Csv => write_series_csv(io::stdout().lock(), &series)?,
        OutputFormat::Table => {
            let label = match measure {
                Measure::Close => "Close".to_string(),
                Measure::MovingAverage => format!("MA({})", view.window().unwrap_or_default()),
            };
            for s in &series {
                println!("=== {} ({label}, {} points) ===", s.symbol, s.points.len());
                for (date, value) in &s.points {
                    println!("{date}  {value:>12.2}");
                }
                println!();
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SeriesCsvRow<'a> {
    symbol: &'a str,
    date: NaiveDate,
    value: f64,
}

fn write_series_csv<W: Write>(out: W, series: &[Series]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(["symbol", "date", "value"])?;
    for s in series {
        for &(date, value) in &s.points {
            writer.serialize(SeriesCsvRow {
                symbol: &s.symbol,
                date,
                value,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
