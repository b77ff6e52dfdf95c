//! Typed views over the resolved configuration tree

use serde::Serialize;
use std::fmt;

/// API credentials. `Debug` never prints the secret material.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .finish()
    }
}

/// Numeric trading and risk limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskLimits {
    pub max_daily_trades: f64,
    pub max_position_size: f64,
    pub max_quantity: f64,
    pub min_quantity: f64,
}

/// Log sink settings (`logging` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    pub log_level: String,
    pub max_log_size: u64,
    pub log_backup_count: u32,
    pub enable_trade_logging: bool,
    pub enable_error_logging: bool,
}

impl LogSettings {
    /// `tracing` filter directive for the configured level.
    /// Unknown levels fall back to `info`.
    pub fn directive(&self) -> &'static str {
        match self.log_level.to_ascii_uppercase().as_str() {
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

/// Interactive UI settings (`ui` section)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiSettings {
    pub show_confirmations: bool,
    pub auto_refresh_account: bool,
    pub display_precision: u32,
}

/// Configuration overview that is safe to print or log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub api: ApiSummary,
    pub trading: TradingSummary,
    pub risk_limits: RiskLimits,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiSummary {
    pub testnet: bool,
    pub timeout: Option<i64>,
    pub has_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSummary {
    pub default_symbol: String,
    pub supported_symbols_count: usize,
}
