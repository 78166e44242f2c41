//! Series — the ordered, date-keyed table of observations.

use super::record::Record;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Records ordered by date ascending.
///
/// Construction always sorts (stably), so `last_date` is the boundary date used
/// for the next incremental fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered records. Rows sharing a date keep their input order.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Rows dated strictly after `boundary`, one per date (first occurrence wins).
    pub fn newer_than(&self, boundary: NaiveDate) -> Vec<Record> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| r.date > boundary)
            .filter(|r| seen.insert(r.date))
            .copied()
            .collect()
    }

    /// Append rows that all come after the current last date.
    ///
    /// Rows must already be ordered and unique; use [`Series::newer_than`] to
    /// obtain them.
    pub fn append(&mut self, rows: Vec<Record>) {
        debug_assert!(match (self.last_date(), rows.first()) {
            (Some(last), Some(first)) => first.date > last,
            _ => true,
        });
        self.records.extend(rows);
    }

    /// Keep only the first record for each date. Returns how many were removed.
    pub fn collapse_duplicate_dates(&mut self) -> usize {
        let before = self.records.len();
        self.records.dedup_by_key(|r| r.date);
        before - self.records.len()
    }

    /// True if no two records share a date and dates strictly increase.
    pub fn is_strictly_increasing(&self) -> bool {
        self.records.windows(2).all(|w| w[0].date < w[1].date)
    }
}
