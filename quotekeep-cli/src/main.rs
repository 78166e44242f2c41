//! quotekeep CLI — keep a daily price CSV up to date.
//!
//! Commands:
//! - `update` (default) — fetch rows newer than the stored last date and append them
//! - `status` — report row count, date range and content digest of the stored file
//! - `config` — print the resolved configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quotekeep_core::data::{CsvStore, YahooProvider};
use quotekeep_core::{run_update, StdoutProgress, UpdateConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotekeep",
    about = "quotekeep — append new daily prices to a local CSV series"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command for locating the series.
#[derive(clap::Args, Default)]
struct Target {
    /// Path to a TOML config file. Defaults to the built-in symbol and file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol to fetch (e.g., 2449.TW). Overrides the config.
    #[arg(long)]
    symbol: Option<String>,

    /// CSV file to update. Overrides the config.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and append rows newer than the last stored date.
    Update {
        #[command(flatten)]
        target: Target,
    },
    /// Report what is currently stored.
    Status {
        #[command(flatten)]
        target: Target,
    },
    /// Print the resolved configuration (defaults, then --config, then flags) as TOML.
    Config {
        #[command(flatten)]
        target: Target,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        None => run_update_cmd(Target::default()),
        Some(Commands::Update { target }) => run_update_cmd(target),
        Some(Commands::Status { target }) => run_status(target),
        Some(Commands::Config { target }) => run_show_config(target),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(target: Target) -> Result<UpdateConfig> {
    let mut config = match &target.config {
        Some(path) => UpdateConfig::from_file(path)?,
        None => UpdateConfig::default(),
    };
    if let Some(symbol) = target.symbol {
        config.symbol = symbol;
    }
    if let Some(file) = target.file {
        config.data_file = file;
    }
    config.validate()?;
    tracing::debug!(?config, "resolved config");
    Ok(config)
}

fn run_update_cmd(target: Target) -> Result<()> {
    let config = resolve_config(target)?;
    let provider = YahooProvider::new(&config.provider)?;

    run_update(&config, &provider, &StdoutProgress)
        .with_context(|| format!("update of {} failed", config.symbol))?;

    Ok(())
}

fn run_status(target: Target) -> Result<()> {
    let config = resolve_config(target)?;
    let store = CsvStore::new(&config.data_file);
    let report = store.load()?;
    let digest = store.digest()?;

    let first = report
        .series
        .first_date()
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    let last = report
        .series
        .last_date()
        .map_or_else(|| "-".to_string(), |d| d.to_string());

    println!("File:       {}", store.path().display());
    println!("Symbol:     {}", config.symbol);
    println!("Rows:       {}", report.series.len());
    println!("Date Range: {first} to {last}");
    println!("Dropped:    {} (invalid dates)", report.dropped);
    println!("Collapsed:  {} (repeated dates)", report.collapsed);
    println!("blake3:     {digest}");

    Ok(())
}

fn run_show_config(target: Target) -> Result<()> {
    let config = resolve_config(target)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotekeep_core::config::DEFAULT_SYMBOL;
    use std::fs;

    #[test]
    fn flags_override_config_file_which_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotekeep.toml");
        fs::write(
            &path,
            r#"
symbol = "2330.TW"
data_file = "from_toml.csv"

[provider]
timeout_secs = 9
"#,
        )
        .unwrap();

        let config = resolve_config(Target {
            config: Some(path),
            symbol: Some("0050.TW".into()),
            file: None,
        })
        .unwrap();

        assert_eq!(config.symbol, "0050.TW");
        assert_eq!(config.data_file, PathBuf::from("from_toml.csv"));
        assert_eq!(config.provider.timeout_secs, 9);
        assert_eq!(config.provider.base_url, UpdateConfig::default().provider.base_url);
    }

    #[test]
    fn file_flag_alone_keeps_default_symbol() {
        let config = resolve_config(Target {
            file: Some(PathBuf::from("elsewhere.csv")),
            ..Target::default()
        })
        .unwrap();

        assert_eq!(config.symbol, DEFAULT_SYMBOL);
        assert_eq!(config.data_file, PathBuf::from("elsewhere.csv"));
    }

    #[test]
    fn empty_symbol_flag_is_rejected() {
        let err = resolve_config(Target {
            symbol: Some(" ".into()),
            ..Target::default()
        })
        .unwrap_err();

        assert!(err.to_string().contains("symbol"));
    }
}
