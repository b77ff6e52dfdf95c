//! Environment access
//!
//! The resolver never touches `std::env` directly; it reads and writes through
//! an [`EnvProvider`] so tests can substitute an in-memory map.

use std::collections::HashMap;

/// Read/write access to environment variables
pub trait EnvProvider {
    /// Value of `key`, or `None` when unset (or not valid unicode)
    fn var(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`
    fn set_var(&mut self, key: &str, value: &str);
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&mut self, key: &str, value: &str) {
        // std::env::set_var panics on these
        if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
            tracing::warn!("Ignoring invalid environment assignment for '{}'", key);
            return;
        }
        std::env::set_var(key, value);
    }
}

/// In-memory environment
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to preset a variable
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvProvider for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set_var(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// One row of the environment override table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvMapping {
    pub var: &'static str,
    pub section: &'static str,
    pub key: &'static str,
}

impl EnvMapping {
    const fn new(var: &'static str, section: &'static str, key: &'static str) -> Self {
        Self { var, section, key }
    }

    /// Dotted destination path, e.g. `api.key`
    pub fn path(&self) -> String {
        format!("{}.{}", self.section, self.key)
    }
}

/// Environment variables that override tree values, applied in this order
pub const ENV_MAPPINGS: [EnvMapping; 20] = [
    // API
    EnvMapping::new("BINANCE_API_KEY", "api", "key"),
    EnvMapping::new("BINANCE_API_SECRET", "api", "secret"),
    EnvMapping::new("BINANCE_TESTNET", "api", "testnet"),
    EnvMapping::new("API_TIMEOUT", "api", "timeout"),
    EnvMapping::new("API_RETRY_ATTEMPTS", "api", "retry_attempts"),
    // Trading
    EnvMapping::new("DEFAULT_SYMBOL", "trading", "default_symbol"),
    EnvMapping::new("MAX_QUANTITY", "trading", "max_quantity"),
    EnvMapping::new("MIN_QUANTITY", "trading", "min_quantity"),
    EnvMapping::new("DEFAULT_ORDER_TYPE", "trading", "default_order_type"),
    // Risk management
    EnvMapping::new("MAX_DAILY_TRADES", "risk_management", "max_daily_trades"),
    EnvMapping::new("MAX_POSITION_SIZE", "risk_management", "max_position_size"),
    EnvMapping::new("ENABLE_STOP_LOSS", "risk_management", "enable_stop_loss"),
    EnvMapping::new("STOP_LOSS_PERCENTAGE", "risk_management", "stop_loss_percentage"),
    EnvMapping::new("TAKE_PROFIT_PERCENTAGE", "risk_management", "take_profit_percentage"),
    // Logging
    EnvMapping::new("LOG_LEVEL", "logging", "log_level"),
    EnvMapping::new("MAX_LOG_SIZE", "logging", "max_log_size"),
    EnvMapping::new("LOG_BACKUP_COUNT", "logging", "log_backup_count"),
    // UI
    EnvMapping::new("SHOW_CONFIRMATIONS", "ui", "show_confirmations"),
    EnvMapping::new("AUTO_REFRESH_ACCOUNT", "ui", "auto_refresh_account"),
    EnvMapping::new("DISPLAY_PRECISION", "ui", "display_precision"),
];
