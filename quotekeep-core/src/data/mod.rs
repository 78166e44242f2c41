//! Data ingestion and storage

pub mod provider;
pub mod schema;
pub mod store;
pub mod yahoo;

pub use provider::{DataError, DataProvider, DataSource, FetchResult, StaticProvider};
pub use schema::{project, ColumnLabel, RawRow, RawTable, SchemaError};
pub use store::{CsvStore, LoadReport, StoreError};
pub use yahoo::YahooProvider;
