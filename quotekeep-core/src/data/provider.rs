//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources so the update
//! pipeline can run against Yahoo Finance in production and a canned table in
//! tests.

use super::schema::RawTable;
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for provider operations.
///
/// These are designed to be displayable directly on the CLI.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    YahooFinance,
    Static,
}

/// Result of a successful fetch for a single symbol. The table is not yet
/// projected onto the stored schema.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub table: RawTable,
    pub source: DataSource,
}

/// Trait for market-data providers.
///
/// Implementations only fetch; schema projection and dedup happen in the
/// update pipeline.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily observations for `symbol` from `start` (inclusive) through today.
    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<FetchResult, DataError>;
}

/// Provider that returns a fixed table regardless of the request.
///
/// Rows before the requested start date are filtered out so that it behaves
/// like an inclusive range query.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    table: RawTable,
}

impl StaticProvider {
    pub fn new(table: RawTable) -> Self {
        Self { table }
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<FetchResult, DataError> {
        let rows = self
            .table
            .rows
            .iter()
            .filter(|row| row.date.map_or(true, |d| d >= start))
            .cloned()
            .collect();

        Ok(FetchResult {
            symbol: symbol.to_string(),
            table: RawTable {
                columns: self.table.columns.clone(),
                rows,
            },
            source: DataSource::Static,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{ColumnLabel, RawRow};

    #[test]
    fn static_provider_honours_inclusive_start() {
        let rows = (9..=12)
            .map(|d| RawRow {
                date: NaiveDate::from_ymd_opt(2024, 1, d),
                values: vec![Some(f64::from(d)); 5],
            })
            .collect();
        let provider = StaticProvider::new(RawTable {
            columns: vec![ColumnLabel::flat("Close")],
            rows,
        });

        let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let result = provider.fetch("2449.TW", start).unwrap();

        assert_eq!(result.symbol, "2449.TW");
        assert_eq!(result.source, DataSource::Static);
        assert_eq!(result.table.rows.len(), 3);
        assert_eq!(result.table.rows[0].date, Some(start));
    }

    #[test]
    fn errors_render_for_cli() {
        let err = DataError::Http {
            status: 503,
            symbol: "2449.TW".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503 for 2449.TW");
    }
}
