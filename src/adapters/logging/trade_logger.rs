//! Trade Logger
//!
//! Owns the log directory layout and installs the process-wide `tracing`
//! subscriber:
//! - console (stderr) at the CLI-selected level
//! - `trading_bot.log` at the configured level (`RUST_LOG` wins when set)
//! - `trading_bot_errors.log` with errors only, when error logging is enabled
//!
//! Executed orders are journaled separately to `trades.log` as one JSON
//! object per line.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::rotating::RotatingFile;
use crate::config::LogSettings;
use crate::domain::OrderReceipt;

pub const MAIN_LOG_FILE: &str = "trading_bot.log";
pub const ERROR_LOG_FILE: &str = "trading_bot_errors.log";
pub const TRADE_LOG_FILE: &str = "trades.log";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Logging already initialised: {0}")]
    AlreadyInstalled(String),

    #[error("Trade journal lock poisoned")]
    Poisoned,
}

/// Size and modification time of one log file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogFileStats {
    Present {
        size_bytes: u64,
        size_mb: f64,
        modified: Option<DateTime<Local>>,
    },
    Missing {
        exists: bool,
    },
}

/// One line of the trade journal; absent fields are omitted
#[derive(Debug, Serialize)]
struct TradeEntry<'a> {
    timestamp: String,
    #[serde(rename = "type")]
    entry_type: &'a str,
    order_id: u64,
    symbol: &'a str,
    side: String,
    order_type: &'static str,
    quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_price: Option<String>,
    status: String,
}

pub struct TradeLogger {
    settings: LogSettings,
    log_dir: PathBuf,
    journal: Option<Mutex<RotatingFile>>,
}

impl std::fmt::Debug for TradeLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeLogger")
            .field("settings", &self.settings)
            .field("log_dir", &self.log_dir)
            .field("journal", &self.journal.is_some())
            .finish()
    }
}

impl TradeLogger {
    /// Create the log directory and open the trade journal (when enabled).
    /// Does not touch the global subscriber; see [`TradeLogger::install`].
    pub fn new(settings: LogSettings, log_dir: impl Into<PathBuf>) -> Result<Self, LoggingError> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir).map_err(|source| LoggingError::Io {
            path: log_dir.clone(),
            source,
        })?;

        let journal = if settings.enable_trade_logging {
            Some(Mutex::new(open_rotating(&log_dir, TRADE_LOG_FILE, &settings)?))
        } else {
            None
        };

        Ok(Self {
            settings,
            log_dir,
            journal,
        })
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.log_dir.join(name)
    }

    /// Install the global subscriber. Fails if one is already set.
    pub fn install(&self, console: LevelFilter) -> Result<(), LoggingError> {
        let file_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.settings.directive()));
        let main_file = open_rotating(&self.log_dir, MAIN_LOG_FILE, &self.settings)?;

        let error_layer = if self.settings.enable_error_logging {
            let error_file = open_rotating(&self.log_dir, ERROR_LOG_FILE, &self.settings)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(Mutex::new(error_file))
                    .with_filter(LevelFilter::ERROR),
            )
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_filter(console),
            )
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(main_file))
                    .with_filter(file_filter),
            )
            .with(error_layer)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;

        self.log_system_event(
            "Logging system initialized",
            Some(&serde_json::json!({
                "log_dir": self.log_dir.display().to_string(),
                "log_level": self.settings.log_level,
            })),
        );
        Ok(())
    }

    /// Append a receipt to the trade journal. No-op when trade logging is off.
    pub fn log_trade(&self, receipt: &OrderReceipt, entry_type: &str) -> Result<(), LoggingError> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };

        let entry = TradeEntry {
            timestamp: Local::now().to_rfc3339(),
            entry_type,
            order_id: receipt.order_id,
            symbol: &receipt.symbol,
            side: receipt.side.to_string(),
            order_type: receipt.kind.exchange_type(),
            quantity: receipt.quantity.to_string(),
            price: receipt.price.map(|p| p.to_string()),
            stop_price: receipt.stop_price.map(|p| p.to_string()),
            status: receipt.status.to_string(),
        };
        // Serializing a struct of strings and integers cannot fail
        let json = serde_json::to_string(&entry).unwrap_or_default();
        let line = format!("{} - {}\n", Local::now().format("%Y-%m-%d %H:%M:%S,%3f"), json);

        let mut file = journal.lock().map_err(|_| LoggingError::Poisoned)?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| LoggingError::Io {
                path: self.file_path(TRADE_LOG_FILE),
                source,
            })
    }

    pub fn log_api_request(&self, endpoint: &str, params: &serde_json::Value, status: &str) {
        tracing::info!("API Request - Endpoint: {}, Params: {}, Status: {}", endpoint, params, status);
    }

    pub fn log_error(&self, error: &dyn std::error::Error, context: &str) {
        if context.is_empty() {
            tracing::error!("{}", error);
        } else {
            tracing::error!("Error in {}: {}", context, error);
        }
    }

    pub fn log_system_event(&self, event: &str, details: Option<&serde_json::Value>) {
        match details {
            Some(details) => tracing::info!("System Event: {} - Details: {}", event, details),
            None => tracing::info!("System Event: {}", event),
        }
    }

    /// Stats for the main, error and trade log files
    pub fn stats(&self) -> BTreeMap<&'static str, LogFileStats> {
        [MAIN_LOG_FILE, ERROR_LOG_FILE, TRADE_LOG_FILE]
            .into_iter()
            .map(|name| (name, file_stats(&self.file_path(name))))
            .collect()
    }
}

fn open_rotating(dir: &Path, name: &str, settings: &LogSettings) -> Result<RotatingFile, LoggingError> {
    let path = dir.join(name);
    RotatingFile::open(&path, settings.max_log_size, settings.log_backup_count)
        .map_err(|source| LoggingError::Io { path, source })
}

fn file_stats(path: &Path) -> LogFileStats {
    match fs::metadata(path) {
        Ok(meta) => {
            let size_bytes = meta.len();
            LogFileStats::Present {
                size_bytes,
                size_mb: (size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            }
        }
        Err(_) => LogFileStats::Missing { exists: false },
    }
}
