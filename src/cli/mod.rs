pub mod adjust;
pub mod cache;
pub mod config;
pub mod index;
pub mod template;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::{RecpamError, Result};
use crate::importer::parse_date_dmy;
use crate::settings::{shellexpand_path, Settings};

/// Index file from `--index`, falling back to the configured default.
pub(crate) fn resolve_index_path(flag: Option<&str>, settings: &Settings) -> Result<PathBuf> {
    flag.map(str::to_string)
        .or_else(|| settings.index_file.clone())
        .map(|p| PathBuf::from(shellexpand_path(&p)))
        .ok_or_else(|| {
            RecpamError::Other(
                "No index table given. Pass --index <file> or run `recpam config --index <file>`."
                    .to_string(),
            )
        })
}

/// Parse `--closing` (DD/MM/YYYY or YYYY-MM-DD), defaulting to `today`.
/// Closing dates after `today` are rejected.
pub(crate) fn resolve_closing_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let date = match raw {
        Some(s) => parse_date_dmy(s).ok_or_else(|| {
            RecpamError::Other(format!("Invalid closing date '{s}' (expected DD/MM/YYYY)"))
        })?,
        None => today,
    };
    if date > today {
        return Err(RecpamError::Other(format!(
            "Closing date {} is in the future",
            date.format("%d/%m/%Y")
        )));
    }
    Ok(date)
}

#[derive(Parser)]
#[command(
    name = "recpam",
    version,
    about = "Restate historical amounts for inflation using a monthly price index."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adjust a CSV/XLSX file of dated amounts to a closing date.
    Adjust {
        /// Transactions file with Fecha (DD/MM/YYYY) and Monto_Historico columns
        file: String,
        /// Index CSV with fecha and ipc_valor columns (default: configured index)
        #[arg(long)]
        index: Option<String>,
        /// Closing date, DD/MM/YYYY (default: today)
        #[arg(long)]
        closing: Option<String>,
        /// Export path (default: <export_dir>/ajuste_inflacion_YYYYMMDD.csv)
        #[arg(long)]
        output: Option<String>,
        /// Print results without writing the CSV export
        #[arg(long = "no-export")]
        no_export: bool,
    },
    /// Summarize an index table.
    Index {
        /// Index CSV (default: configured index)
        #[arg(long)]
        index: Option<String>,
        /// List every period and value
        #[arg(long)]
        all: bool,
    },
    /// Write a sample transactions file to fill in.
    Template {
        /// Output path
        #[arg(long, default_value = "ejemplo.csv")]
        output: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show or change default settings.
    Config {
        /// Default index CSV
        #[arg(long)]
        index: Option<String>,
        /// Currency symbol used in printed amounts
        #[arg(long)]
        symbol: Option<String>,
        /// Directory for CSV exports
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
    /// Manage cached index tables.
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Delete all cached index tables.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_resolve_closing_date() {
        let today = d(2024, 5, 20);
        assert_eq!(resolve_closing_date(Some("31/12/2023"), today).unwrap(), d(2023, 12, 31));
        assert_eq!(resolve_closing_date(Some("2023-12-31"), today).unwrap(), d(2023, 12, 31));
        assert_eq!(resolve_closing_date(None, today).unwrap(), today);
    }

    #[test]
    fn test_resolve_closing_date_rejects_future_and_garbage() {
        let today = d(2024, 5, 20);
        assert!(resolve_closing_date(Some("21/05/2024"), today).is_err());
        assert!(resolve_closing_date(Some("diciembre"), today).is_err());
    }

    #[test]
    fn test_resolve_index_path_prefers_flag() {
        let settings = Settings {
            index_file: Some("/configured/ipc.csv".to_string()),
            ..Settings::default()
        };
        let from_flag = resolve_index_path(Some("/flag/ipc.csv"), &settings).unwrap();
        assert_eq!(from_flag, PathBuf::from("/flag/ipc.csv"));
        let from_settings = resolve_index_path(None, &settings).unwrap();
        assert_eq!(from_settings, PathBuf::from("/configured/ipc.csv"));
        assert!(resolve_index_path(None, &Settings::default()).is_err());
    }
}
