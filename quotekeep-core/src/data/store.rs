//! CSV store for a single series.
//!
//! Layout: header row, then `Date,Close,High,Low,Open,Volume` with ISO dates.
//!
//! Features:
//! - Positional read of the first six columns (header names are ignored)
//! - Rows whose date does not parse are dropped and counted
//! - Repeated dates collapse to the first row in file order
//! - Atomic writes (write to `.tmp`, rename into place)
//! - Content digest for change detection

use crate::domain::{Record, Series, REQUIRED_FIELDS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Date column plus the five fields.
const STORED_COLUMNS: usize = REQUIRED_FIELDS.len() + 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {detail}", .path.display())]
    Format { path: PathBuf, detail: String },

    #[error("no rows with a valid date in {}", .path.display())]
    Empty { path: PathBuf },

    #[error("failed to write {}: {detail}", .path.display())]
    Write { path: PathBuf, detail: String },
}

/// Outcome of loading the stored file.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub series: Series,
    /// Rows discarded because their date column did not parse.
    pub dropped: usize,
    /// Rows discarded because an earlier row already had the same date.
    pub collapsed: usize,
}

/// A series persisted as one CSV file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Sibling temp file used for atomic replacement.
    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{name}.tmp"))
    }

    fn format_err(&self, detail: impl Into<String>) -> StoreError {
        StoreError::Format {
            path: self.path.clone(),
            detail: detail.into(),
        }
    }

    /// Load the stored series, sorted by date ascending.
    pub fn load(&self) -> Result<LoadReport, StoreError> {
        if !self.exists() {
            return Err(StoreError::NotFound {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.format_err(e.to_string()))?;

        let width = reader
            .headers()
            .map_err(|e| self.format_err(e.to_string()))?
            .len();
        if width < STORED_COLUMNS {
            return Err(self.format_err(format!(
                "expected at least {STORED_COLUMNS} columns, header has {width}"
            )));
        }

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for row in reader.records() {
            let row = row.map_err(|e| self.format_err(e.to_string()))?;
            let line = row.position().map_or(0, |p| p.line());

            let Some(date) = row.get(0).and_then(parse_date) else {
                dropped += 1;
                continue;
            };

            let mut values = [f64::NAN; 5];
            for (slot, col) in values.iter_mut().zip(1..STORED_COLUMNS) {
                *slot = parse_value(row.get(col).unwrap_or("")).ok_or_else(|| {
                    self.format_err(format!(
                        "line {line}, column {col}: not a number: {:?}",
                        row.get(col).unwrap_or("")
                    ))
                })?;
            }

            records.push(Record::from_values(date, values));
        }

        if dropped > 0 {
            warn!(dropped, path = %self.path.display(), "dropped rows with invalid dates");
        }
        if records.is_empty() {
            return Err(StoreError::Empty {
                path: self.path.clone(),
            });
        }

        // One row per date; the first in file order wins.
        let mut series = Series::from_records(records);
        let collapsed = series.collapse_duplicate_dates();
        if collapsed > 0 {
            warn!(collapsed, path = %self.path.display(), "collapsed rows with repeated dates");
        }

        debug!(rows = series.len(), "loaded stored series");
        Ok(LoadReport {
            series,
            dropped,
            collapsed,
        })
    }

    /// Replace the stored file with `series`.
    ///
    /// The file is written next to the target and renamed into place, so a
    /// failed write leaves the previous contents untouched.
    pub fn save(&self, series: &Series) -> Result<(), StoreError> {
        let tmp_path = self.tmp_path();

        let result = write_csv(&tmp_path, series).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = result {
            // Clean up temp file on failure
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Write {
                path: self.path.clone(),
                detail: e.to_string(),
            });
        }

        debug!(rows = series.len(), path = %self.path.display(), "series written");
        Ok(())
    }

    /// blake3 digest of the file contents, hex encoded.
    pub fn digest(&self) -> Result<String, StoreError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound {
                path: self.path.clone(),
            },
            _ => self.format_err(e.to_string()),
        })?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

fn write_csv(path: &Path, series: &Series) -> std::io::Result<()> {
    let file = fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    let header: Vec<&str> = std::iter::once("Date")
        .chain(REQUIRED_FIELDS.iter().map(|f| f.label()))
        .collect();
    wtr.write_record(&header)?;

    for record in series.records() {
        // Written field by field from the fixed list, never from the record layout.
        let row: Vec<String> = std::iter::once(record.date.format("%Y-%m-%d").to_string())
            .chain(REQUIRED_FIELDS.iter().map(|f| format_value(record.get(*f))))
            .collect();
        wtr.write_record(&row)?;
    }

    let mut file = wtr.into_inner().map_err(|e| e.into_error())?;
    file.flush()?;
    file.sync_all()
}

/// Parse the date column. Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Empty cells are missing values.
fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse().ok()
}

/// Shortest round-trip decimal form, empty for missing.
fn format_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}
