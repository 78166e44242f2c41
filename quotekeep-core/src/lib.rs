//! quotekeep core — keeps a daily price CSV current from a market-data provider.
//!
//! This crate contains:
//! - Domain types (records, series, the fixed five-field schema)
//! - CSV store with positional load and atomic replace
//! - Provider trait, Yahoo Finance provider, label flattening/projection
//! - The incremental update pipeline

pub mod config;
pub mod data;
pub mod domain;
pub mod update;

pub use config::{ConfigError, ProviderConfig, UpdateConfig};
pub use update::{
    merge_newer, run_update, StdoutProgress, UpdateError, UpdateOutcome, UpdateProgress,
};
