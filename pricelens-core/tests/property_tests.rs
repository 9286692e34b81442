//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Filter output is a subsequence of the source and satisfies the predicate
//! 2. An empty symbol set always filters to nothing
//! 3. Moving average preserves row count and order
//! 4. Summary keys equal the distinct input symbols
//! 5. No stage mutates its input

use chrono::NaiveDate;
use pricelens_core::{filter, summarize, with_moving_average, Dataset, FilterCriteria, Record};
use proptest::prelude::*;
use std::collections::BTreeSet;

const SYMBOLS: [&str; 4] = ["AAPL", "MSFT", "TSLA", "AMZN"];

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..60).prop_map(|d| base_date() + chrono::Duration::days(d))
}

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_record() -> impl Strategy<Value = Record> {
    (0..SYMBOLS.len(), arb_date(), arb_price(), 0u64..10_000_000).prop_map(
        |(s, date, close, volume)| Record {
            symbol: SYMBOLS[s].to_string(),
            date,
            open: close,
            close,
            high: close + 1.0,
            low: close - 1.0,
            volume,
        },
    )
}

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(arb_record(), 0..80).prop_map(Dataset::new)
}

fn arb_symbol_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::sample::subsequence(SYMBOLS.to_vec(), 0..=SYMBOLS.len())
        .prop_map(|picked| picked.into_iter().map(String::from).collect())
}

fn is_subsequence(sub: &[Record], full: &[Record]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|r| it.any(|f| f == r))
}

proptest! {
    #[test]
    fn filter_output_is_matching_subsequence(
        dataset in arb_dataset(),
        symbols in arb_symbol_set(),
        a in arb_date(),
        b in arb_date(),
    ) {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let criteria = FilterCriteria { symbols, start, end };
        let out = filter(&dataset, &criteria);

        prop_assert!(out.iter().all(|r| criteria.matches(r)));
        prop_assert!(is_subsequence(out.records(), dataset.records()));
        let expected = dataset.iter().filter(|r| criteria.matches(r)).count();
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn empty_symbol_set_filters_to_nothing(
        dataset in arb_dataset(),
        a in arb_date(),
        b in arb_date(),
    ) {
        let criteria = FilterCriteria { symbols: BTreeSet::new(), start: a, end: b };
        prop_assert!(filter(&dataset, &criteria).is_empty());
    }

    #[test]
    fn moving_average_preserves_rows(dataset in arb_dataset(), window in 1usize..12) {
        let before = dataset.clone();
        let view = with_moving_average(&dataset, window).unwrap();

        prop_assert_eq!(view.len(), dataset.len());
        prop_assert_eq!(view.to_dataset(), dataset.clone());
        prop_assert_eq!(dataset, before);
    }

    #[test]
    fn moving_average_warmup_per_symbol(dataset in arb_dataset(), window in 1usize..12) {
        let view = with_moving_average(&dataset, window).unwrap();
        for symbol in dataset.symbols() {
            let total = dataset.iter().filter(|r| r.symbol == symbol).count();
            let valued = view
                .rows()
                .iter()
                .filter(|r| r.record.symbol == symbol && r.moving_average.is_some())
                .count();
            prop_assert_eq!(valued, total.saturating_sub(window - 1));
        }
    }

    #[test]
    fn summary_keys_are_distinct_symbols(dataset in arb_dataset()) {
        let stats = summarize(&dataset);
        let keys: BTreeSet<&str> = stats.keys().map(|k| k.as_str()).collect();
        let symbols: BTreeSet<&str> = dataset.symbols().into_iter().collect();
        prop_assert_eq!(keys, symbols);

        for (symbol, s) in &stats {
            let n = dataset.iter().filter(|r| &r.symbol == symbol).count();
            prop_assert_eq!(s.close.count, n);
            let min = s.close.min.unwrap();
            let max = s.close.max.unwrap();
            let median = s.close.median.unwrap();
            prop_assert!(min <= median && median <= max);
        }
    }
}
