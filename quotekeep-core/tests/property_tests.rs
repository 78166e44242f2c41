//! Property tests for merge and store invariants.
//!
//! Uses proptest to verify:
//! 1. No duplicate dates — merged series holds at most one row per date
//! 2. Monotonic ordering — merged dates strictly increase
//! 3. Boundary — nothing at or before the stored last date is appended
//! 4. Persistence — save then load gives back the same series

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use quotekeep_core::data::CsvStore;
use quotekeep_core::domain::{Record, Series};
use quotekeep_core::merge_newer;
use std::collections::HashSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_record() -> impl Strategy<Value = Record> {
    (0i64..120, arb_price(), 0u32..5_000_000).prop_map(|(offset, px, vol)| {
        Record::from_values(
            base_date() + Duration::days(offset),
            [px, px + 1.0, px - 0.5, px + 0.25, f64::from(vol)],
        )
    })
}

/// A stored series: unique dates, as a loaded file would normally be.
fn arb_stored() -> impl Strategy<Value = Series> {
    prop::collection::vec(arb_record(), 1..40).prop_map(|mut records| {
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.date));
        Series::from_records(records)
    })
}

/// A candidate series: duplicates and overlap allowed.
fn arb_candidate() -> impl Strategy<Value = Series> {
    prop::collection::vec(arb_record(), 0..40).prop_map(Series::from_records)
}

proptest! {
    #[test]
    fn merged_dates_are_unique_and_increasing(stored in arb_stored(), candidate in arb_candidate()) {
        let mut merged = stored.clone();
        merge_newer(&mut merged, &candidate);

        prop_assert!(merged.is_strictly_increasing());
        let dates: HashSet<_> = merged.records().iter().map(|r| r.date).collect();
        prop_assert_eq!(dates.len(), merged.len());
    }

    #[test]
    fn only_rows_after_boundary_are_appended(stored in arb_stored(), candidate in arb_candidate()) {
        let boundary = stored.last_date().unwrap();
        let mut merged = stored.clone();
        let appended = merge_newer(&mut merged, &candidate);

        prop_assert_eq!(merged.len(), stored.len() + appended);
        prop_assert_eq!(&merged.records()[..stored.len()], stored.records());
        for r in &merged.records()[stored.len()..] {
            prop_assert!(r.date > boundary);
        }

        let expected: HashSet<_> = candidate
            .records()
            .iter()
            .map(|r| r.date)
            .filter(|d| *d > boundary)
            .collect();
        prop_assert_eq!(appended, expected.len());
    }

    #[test]
    fn merging_twice_appends_nothing(stored in arb_stored(), candidate in arb_candidate()) {
        let mut merged = stored;
        merge_newer(&mut merged, &candidate);
        let once = merged.clone();

        prop_assert_eq!(merge_newer(&mut merged, &candidate), 0);
        prop_assert_eq!(merged, once);
    }

    #[test]
    fn save_then_load_is_lossless(stored in arb_stored()) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("prop.csv"));

        store.save(&stored).unwrap();
        let report = store.load().unwrap();

        prop_assert_eq!(report.dropped, 0);
        prop_assert_eq!(report.series, stored);
    }
}
