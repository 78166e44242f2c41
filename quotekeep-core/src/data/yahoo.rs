//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV rows from Yahoo's v8 chart API. Yahoo has no official API
//! and is subject to unannounced format changes, so every quote series is
//! optional here and a missing one surfaces later as a schema error.
//!
//! Columns are labelled `(Field, symbol)`, the same two-level shape other
//! Yahoo clients produce, and are flattened by [`crate::data::schema::project`].

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use super::schema::{ColumnLabel, RawRow, RawTable};
use crate::config::ProviderConfig;
use crate::domain::Field;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    close: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    open: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

impl QuoteData {
    fn series(&self, field: Field) -> Option<&Vec<Option<f64>>> {
        match field {
            Field::Close => self.close.as_ref(),
            Field::High => self.high.as_ref(),
            Field::Low => self.low.as_ref(),
            Field::Open => self.open.as_ref(),
            Field::Volume => self.volume.as_ref(),
        }
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the chart API URL for a symbol from `start` (midnight UTC) to `end_ts`.
    fn chart_url(base_url: &str, symbol: &str, start: NaiveDate, end_ts: i64) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!(
            "{base_url}/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }
}

/// Parse a chart API body into a labelled table.
///
/// Only the quote series present in the response become columns. Rows where
/// every series is null (holidays) are skipped.
pub fn parse_chart(symbol: &str, body: &str) -> Result<RawTable, DataError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
    })?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    let gmtoffset = data.meta.map_or(0, |m| m.gmtoffset);
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let present: Vec<(Field, &Vec<Option<f64>>)> = crate::domain::REQUIRED_FIELDS
        .into_iter()
        .filter_map(|f| quote.series(f).map(|s| (f, s)))
        .collect();

    let columns = present
        .iter()
        .map(|(f, _)| ColumnLabel::nested([f.label(), symbol]))
        .collect();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let values: Vec<Option<f64>> = present
            .iter()
            .map(|(_, s)| s.get(i).copied().flatten())
            .collect();

        if values.iter().all(Option::is_none) {
            continue;
        }

        rows.push(RawRow {
            date: Some(date),
            values,
        });
    }

    Ok(RawTable { columns, rows })
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<FetchResult, DataError> {
        let url = Self::chart_url(&self.base_url, symbol, start, Utc::now().timestamp());
        debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let body = resp.text().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to read body for {symbol}: {e}"))
        })?;
        let table = parse_chart(symbol, &body)?;
        debug!(rows = table.rows.len(), "chart parsed");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            table,
            source: DataSource::YahooFinance,
        })
    }
}
