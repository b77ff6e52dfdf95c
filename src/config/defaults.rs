//! Built-in configuration defaults
//!
//! The lowest-precedence layer. Every load starts from a fresh copy of this tree.

use super::value::{table, ConfigTable, ConfigValue};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_ENV_FILE: &str = ".env";

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_LOG_BACKUP_COUNT: u32 = 5;
pub const DEFAULT_DISPLAY_PRECISION: u32 = 8;

/// Accepted values for `logging.log_level` (compared case-insensitively)
pub const VALID_LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

pub fn default_tree() -> ConfigTable {
    table([
        (
            "api",
            ConfigValue::Table(table([
                ("testnet", true.into()),
                ("timeout", 30.into()),
                ("retry_attempts", 3.into()),
                ("rate_limit_buffer", 0.1.into()),
            ])),
        ),
        (
            "trading",
            ConfigValue::Table(table([
                ("default_symbol", DEFAULT_SYMBOL.into()),
                ("max_quantity", 1000.into()),
                ("min_quantity", 0.001.into()),
                ("supported_symbols", ConfigValue::StringList(default_supported_symbols())),
                ("default_order_type", "LIMIT".into()),
            ])),
        ),
        (
            "risk_management",
            ConfigValue::Table(table([
                ("max_daily_trades", 50.into()),
                ("max_position_size", 100.into()),
                ("enable_stop_loss", true.into()),
                ("stop_loss_percentage", 2.0.into()),
                ("take_profit_percentage", 5.0.into()),
            ])),
        ),
        (
            "logging",
            ConfigValue::Table(table([
                ("log_level", "INFO".into()),
                ("max_log_size", (DEFAULT_MAX_LOG_SIZE as i64).into()),
                ("log_backup_count", (DEFAULT_LOG_BACKUP_COUNT as i64).into()),
                ("enable_trade_logging", true.into()),
                ("enable_error_logging", true.into()),
            ])),
        ),
        (
            "ui",
            ConfigValue::Table(table([
                ("show_confirmations", true.into()),
                ("auto_refresh_account", false.into()),
                ("display_precision", (DEFAULT_DISPLAY_PRECISION as i64).into()),
            ])),
        ),
    ])
}

pub fn default_supported_symbols() -> Vec<String> {
    ["BTCUSDT", "ETHUSDT", "ADAUSDT", "DOTUSDT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::value::lookup;

    #[test]
    fn test_defaults_cover_all_sections() {
        let tree = default_tree();
        for section in ["api", "trading", "risk_management", "logging", "ui"] {
            assert!(tree.get(section).and_then(|v| v.as_table()).is_some(), "missing {}", section);
        }
    }

    #[test]
    fn test_default_values() {
        let tree = default_tree();
        assert_eq!(lookup(&tree, "api.testnet"), Some(&ConfigValue::Bool(true)));
        assert_eq!(lookup(&tree, "api.timeout"), Some(&ConfigValue::Int(30)));
        assert_eq!(lookup(&tree, "trading.min_quantity"), Some(&ConfigValue::Float(0.001)));
        assert_eq!(lookup(&tree, "risk_management.max_daily_trades"), Some(&ConfigValue::Int(50)));
        assert_eq!(lookup(&tree, "logging.max_log_size"), Some(&ConfigValue::Int(10_485_760)));
        assert_eq!(
            lookup(&tree, "trading.supported_symbols").and_then(|v| v.as_list()).map(|l| l.len()),
            Some(4)
        );
    }

    #[test]
    fn test_defaults_have_no_credentials() {
        let tree = default_tree();
        assert!(lookup(&tree, "api.key").is_none());
        assert!(lookup(&tree, "api.secret").is_none());
    }
}
