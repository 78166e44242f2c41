//! Incremental update: load → fetch → merge → store.
//!
//! The provider query is inclusive of the last stored date, so the boundary row
//! normally comes back again. It is removed here by the strict `date > last`
//! rule, never on the request side.

use crate::config::UpdateConfig;
use crate::data::provider::{DataError, DataProvider};
use crate::data::schema::{self, SchemaError};
use crate::data::store::{CsvStore, StoreError};
use crate::domain::Series;
use chrono::NaiveDate;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] DataError),

    #[error("fetched data rejected: {0}")]
    Schema(#[from] SchemaError),
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing newer than `last_date`; the file was not touched.
    UpToDate { last_date: NaiveDate },
    /// `appended` rows were added and the file rewritten.
    Appended {
        appended: usize,
        last_date: NaiveDate,
        total_rows: usize,
    },
}

/// Per-phase status callbacks.
pub trait UpdateProgress {
    /// Called before the stored file is read.
    fn on_start(&self, symbol: &str, path: &Path);

    /// Called once the stored series is loaded and cleaned.
    fn on_loaded(&self, rows: usize, dropped: usize, collapsed: usize, last_date: NaiveDate);

    /// Called after the provider returned and the rows were projected.
    fn on_fetched(&self, provider: &str, rows: usize);

    /// Called when no row is newer than the stored series.
    fn on_up_to_date(&self, last_date: NaiveDate);

    /// Called after the merged series was written.
    fn on_appended(&self, appended: usize, last_date: NaiveDate, path: &Path);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl UpdateProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, path: &Path) {
        println!("Updating {symbol} in {}...", path.display());
    }

    fn on_loaded(&self, rows: usize, dropped: usize, collapsed: usize, last_date: NaiveDate) {
        println!(
            "Loaded {rows} rows ({dropped} with invalid dates dropped). \
             Last valid date: {last_date}. Fetching latest data..."
        );
        if collapsed > 0 {
            println!("Collapsed {collapsed} rows with repeated dates.");
        }
    }

    fn on_fetched(&self, provider: &str, rows: usize) {
        println!("Fetched {rows} rows from {provider}.");
    }

    fn on_up_to_date(&self, last_date: NaiveDate) {
        println!("Already up to date (last date {last_date}); nothing to append.");
    }

    fn on_appended(&self, appended: usize, last_date: NaiveDate, path: &Path) {
        println!(
            "Update complete: appended {appended} new rows through {last_date} to {}.",
            path.display()
        );
    }
}

/// Reporter that prints nothing.
pub struct SilentProgress;

impl UpdateProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _path: &Path) {}
    fn on_loaded(&self, _rows: usize, _dropped: usize, _collapsed: usize, _last_date: NaiveDate) {}
    fn on_fetched(&self, _provider: &str, _rows: usize) {}
    fn on_up_to_date(&self, _last_date: NaiveDate) {}
    fn on_appended(&self, _appended: usize, _last_date: NaiveDate, _path: &Path) {}
}

/// Append the candidate rows dated strictly after the stored series' last date.
///
/// Returns the number of rows appended. Candidate rows sharing a date are
/// collapsed to the first one.
pub fn merge_newer(stored: &mut Series, candidate: &Series) -> usize {
    let boundary = stored.last_date().unwrap_or(NaiveDate::MIN);
    let fresh = candidate.newer_than(boundary);
    let appended = fresh.len();
    stored.append(fresh);
    appended
}

/// Run one update for `config.symbol` against `config.data_file`.
pub fn run_update(
    config: &UpdateConfig,
    provider: &dyn DataProvider,
    progress: &dyn UpdateProgress,
) -> Result<UpdateOutcome, UpdateError> {
    let store = CsvStore::new(&config.data_file);
    progress.on_start(&config.symbol, store.path());

    let report = store.load()?;
    let mut series = report.series;
    let last_date = series.last_date().ok_or_else(|| StoreError::Empty {
        path: store.path().to_path_buf(),
    })?;
    progress.on_loaded(series.len(), report.dropped, report.collapsed, last_date);

    let fetched = provider.fetch(&config.symbol, last_date)?;
    let candidate = schema::project(&fetched.table)?;
    debug!(source = ?fetched.source, rows = candidate.len(), "candidate series projected");
    progress.on_fetched(provider.name(), candidate.len());

    let appended = merge_newer(&mut series, &candidate);
    if appended == 0 {
        progress.on_up_to_date(last_date);
        return Ok(UpdateOutcome::UpToDate { last_date });
    }

    store.save(&series)?;
    let new_last = series.last_date().unwrap_or(last_date);
    info!(symbol = %config.symbol, appended, last_date = %new_last, "series updated");
    progress.on_appended(appended, new_last, store.path());

    Ok(UpdateOutcome::Appended {
        appended,
        last_date: new_last,
        total_rows: series.len(),
    })
}
