//! Configuration Loader
//!
//! Resolves the configuration tree from four layered sources
//! (lowest to highest precedence):
//!
//! 1. built-in defaults
//! 2. structured config file (deep-merged)
//! 3. dotenv file (written into the environment, not the tree)
//! 4. environment variables listed in [`ENV_MAPPINGS`]
//!
//! Loading never fails: unreadable or malformed sources are logged and skipped,
//! so the result is at minimum the defaults.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::defaults::{
    default_tree, DEFAULT_DISPLAY_PRECISION, DEFAULT_LOG_BACKUP_COUNT, DEFAULT_MAX_LOG_SIZE,
    DEFAULT_SYMBOL, VALID_LOG_LEVELS,
};
use super::document::{read_document, write_document};
use super::dotenv;
use super::env::{EnvProvider, ProcessEnv, ENV_MAPPINGS};
use super::error::{ConfigError, ValidationError};
use super::settings::{
    ApiSummary, ConfigSummary, Credentials, LogSettings, RiskLimits, TradingSummary, UiSettings,
};
use super::value::{assign, coerce_env_value, deep_merge, lookup, ConfigTable, ConfigValue};

/// What happened to a file source during a load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SourceStatus {
    /// File does not exist
    #[default]
    Missing,
    /// File was read and applied
    Applied,
    /// File exists but could not be used
    Skipped(String),
}

/// Outcome of the last load, safe to log (no values, only sources)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub config_file: SourceStatus,
    pub env_file: SourceStatus,
    /// Variables the dotenv file wrote into the environment
    pub dotenv_vars: usize,
    /// Environment variables that overrode tree values
    pub env_overrides: Vec<&'static str>,
}

impl LoadReport {
    /// File sources that existed but could not be applied, as (source, reason)
    pub fn problems(&self) -> Vec<(&'static str, &str)> {
        [("config file", &self.config_file), (".env file", &self.env_file)]
            .into_iter()
            .filter_map(|(source, status)| match status {
                SourceStatus::Skipped(reason) => Some((source, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Re-emit load failures as error events. Loading usually happens
    /// before a subscriber is installed, so the originals are lost.
    pub fn log_problems(&self) {
        for (source, reason) in self.problems() {
            tracing::error!("Error loading {}: {}", source, reason);
        }
    }
}

/// Layered configuration resolver
#[derive(Debug)]
pub struct ConfigManager<E = ProcessEnv> {
    config_path: PathBuf,
    env_path: PathBuf,
    env: E,
    tree: ConfigTable,
    report: LoadReport,
}

/// Load from the given files against the real process environment
pub fn load_config(config_path: impl Into<PathBuf>, env_path: impl Into<PathBuf>) -> ConfigManager {
    ConfigManager::load(config_path, env_path, ProcessEnv)
}

impl<E: EnvProvider> ConfigManager<E> {
    /// Build the tree from all sources
    pub fn load(config_path: impl Into<PathBuf>, env_path: impl Into<PathBuf>, env: E) -> Self {
        let mut manager = Self {
            config_path: config_path.into(),
            env_path: env_path.into(),
            env,
            tree: default_tree(),
            report: LoadReport::default(),
        };
        manager.reload();
        manager
    }

    /// Rebuild the tree from scratch, discarding in-memory changes
    pub fn reload(&mut self) -> &LoadReport {
        self.tree = default_tree();

        let config_file = self.merge_config_file();
        let (env_file, dotenv_vars) = self.load_env_file();
        let env_overrides = self.apply_env_overrides();

        self.report = LoadReport {
            config_file,
            env_file,
            dotenv_vars,
            env_overrides,
        };

        tracing::info!("Configuration loaded successfully");
        &self.report
    }

    fn merge_config_file(&mut self) -> SourceStatus {
        if !self.config_path.exists() {
            tracing::debug!("No config file at {}", self.config_path.display());
            return SourceStatus::Missing;
        }

        match read_document(&self.config_path) {
            Ok(document) => {
                deep_merge(&mut self.tree, document);
                tracing::info!("Configuration loaded from {}", self.config_path.display());
                SourceStatus::Applied
            }
            Err(e) => {
                tracing::error!("Error loading config file: {}", e);
                SourceStatus::Skipped(e.to_string())
            }
        }
    }

    fn load_env_file(&mut self) -> (SourceStatus, usize) {
        if !self.env_path.exists() {
            return (SourceStatus::Missing, 0);
        }

        match dotenv::load_into(&self.env_path, &mut self.env) {
            Ok(count) => {
                tracing::info!("Environment variables loaded from {}", self.env_path.display());
                (SourceStatus::Applied, count)
            }
            Err(e) => {
                tracing::error!("Error loading .env file: {}", e);
                (SourceStatus::Skipped(e.to_string()), 0)
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Vec<&'static str> {
        let mut applied = Vec::new();

        for mapping in ENV_MAPPINGS.iter() {
            if let Some(raw) = self.env.var(mapping.var) {
                assign(&mut self.tree, &mapping.path(), coerce_env_value(&raw));
                applied.push(mapping.var);
            }
        }

        if !applied.is_empty() {
            tracing::debug!("Applied {} environment overrides", applied.len());
        }
        applied
    }

    /// Value at a dotted path, if present
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        lookup(&self.tree, path)
    }

    /// Value at a dotted path, or `default` when the path does not resolve
    pub fn get_or(&self, path: &str, default: impl Into<ConfigValue>) -> ConfigValue {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_i64()
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Assign at a dotted path, creating intermediate tables as needed
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) {
        assign(&mut self.tree, path, value.into());
    }

    pub fn tree(&self) -> &ConfigTable {
        &self.tree
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    /// Copy of the tree without `api.key` / `api.secret`
    pub fn export_safe(&self) -> ConfigTable {
        let mut safe = self.tree.clone();
        if let Some(ConfigValue::Table(api)) = safe.get_mut("api") {
            api.remove("key");
            api.remove("secret");
        }
        safe
    }

    /// Write the credential-free tree to `path` (format from its extension)
    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        match write_document(path, &self.export_safe()) {
            Ok(()) => {
                tracing::info!("Configuration saved to {}", path.display());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error saving config: {}", e);
                Err(e)
            }
        }
    }

    /// Persist back to the file the configuration was loaded from
    pub fn save(&self) -> Result<(), ConfigError> {
        self.persist(&self.config_path)
    }

    /// Run every rule, stopping at the first failure
    pub fn check(&self) -> Result<(), ValidationError> {
        self.api_credentials()?;

        for (name, value) in self.limit_values() {
            match value.as_f64() {
                Some(v) if v > 0.0 => {}
                _ => return Err(ValidationError::InvalidLimit { name, value }),
            }
        }

        let symbol = self.get_or("trading.default_symbol", DEFAULT_SYMBOL);
        match symbol.as_str() {
            Some(s) if s.chars().count() >= 3 => {}
            _ => return Err(ValidationError::InvalidSymbol(symbol)),
        }

        let level = self.get_or("logging.log_level", "INFO");
        let known = level
            .as_str()
            .map(|l| VALID_LOG_LEVELS.contains(&l.to_ascii_uppercase().as_str()))
            .unwrap_or(false);
        if !known {
            return Err(ValidationError::InvalidLogLevel(level));
        }

        Ok(())
    }

    /// Pass/fail validation; the failure is reported through `tracing`
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Configuration validation failed: {}", e);
                false
            }
        }
    }

    fn limit_values(&self) -> [(&'static str, ConfigValue); 4] {
        [
            ("max_daily_trades", self.get_or("risk_management.max_daily_trades", 50)),
            ("max_position_size", self.get_or("risk_management.max_position_size", 100)),
            ("max_quantity", self.get_or("trading.max_quantity", 1000)),
            ("min_quantity", self.get_or("trading.min_quantity", 0.001)),
        ]
    }

    /// API key and secret; both must be present and non-empty
    pub fn api_credentials(&self) -> Result<Credentials, ValidationError> {
        let key = self.get("api.key").and_then(credential_text);
        let secret = self.get("api.secret").and_then(credential_text);

        match (key, secret) {
            (Some(key), Some(secret)) => Ok(Credentials::new(key, secret)),
            _ => Err(ValidationError::MissingCredentials),
        }
    }

    pub fn is_testnet(&self) -> bool {
        self.get_bool("api.testnet").unwrap_or(true)
    }

    pub fn default_symbol(&self) -> String {
        self.get_str("trading.default_symbol")
            .unwrap_or(DEFAULT_SYMBOL)
            .to_string()
    }

    pub fn supported_symbols(&self) -> Vec<String> {
        self.get("trading.supported_symbols")
            .and_then(ConfigValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()])
    }

    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            max_daily_trades: self.get_f64("risk_management.max_daily_trades").unwrap_or(50.0),
            max_position_size: self.get_f64("risk_management.max_position_size").unwrap_or(100.0),
            max_quantity: self.get_f64("trading.max_quantity").unwrap_or(1000.0),
            min_quantity: self.get_f64("trading.min_quantity").unwrap_or(0.001),
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            log_level: self.get_str("logging.log_level").unwrap_or("INFO").to_string(),
            max_log_size: self
                .get_i64("logging.max_log_size")
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(DEFAULT_MAX_LOG_SIZE),
            log_backup_count: self
                .get_i64("logging.log_backup_count")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_LOG_BACKUP_COUNT),
            enable_trade_logging: self.get_bool("logging.enable_trade_logging").unwrap_or(true),
            enable_error_logging: self.get_bool("logging.enable_error_logging").unwrap_or(true),
        }
    }

    pub fn ui_settings(&self) -> UiSettings {
        UiSettings {
            show_confirmations: self.get_bool("ui.show_confirmations").unwrap_or(true),
            auto_refresh_account: self.get_bool("ui.auto_refresh_account").unwrap_or(false),
            display_precision: self
                .get_i64("ui.display_precision")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_DISPLAY_PRECISION),
        }
    }

    /// Overview for printing or logging; reports only whether credentials exist
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            api: ApiSummary {
                testnet: self.is_testnet(),
                timeout: self.get_i64("api.timeout"),
                has_credentials: self.api_credentials().is_ok(),
            },
            trading: TradingSummary {
                default_symbol: self.default_symbol(),
                supported_symbols_count: self.supported_symbols().len(),
            },
            risk_limits: self.risk_limits(),
            logging: self.log_settings(),
        }
    }
}

/// Credentials may arrive coerced from the environment; render them back.
/// Empty, zero and false count as absent.
fn credential_text(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::String(s) if !s.is_empty() => Some(s.clone()),
        ConfigValue::Int(i) if *i != 0 => Some(i.to_string()),
        ConfigValue::Float(f) if *f != 0.0 => Some(f.to_string()),
        ConfigValue::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
