//! Configuration Integration Tests
//!
//! Exercise the full resolution pipeline through the public API:
//! defaults -> TOML/JSON file -> dotenv -> environment overrides,
//! then validation, typed views and persistence.
//!
//! The process environment is never touched; every test injects a `MapEnv`.

use approx::assert_relative_eq;
use futures_bot::config::{
    ConfigManager, ConfigValue, EnvProvider, MapEnv, SourceStatus, ValidationError,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// ============================================================================
// Fixtures
// ============================================================================

const TOML_CONFIG: &str = r#"
[api]
testnet = false
timeout = 10

[trading]
default_symbol = "ETHUSDT"
max_quantity = 25.5
supported_symbols = ["ETHUSDT", "SOLUSDT"]

[logging]
log_level = "debug"

[custom]
note = "kept"
"#;

const DOTENV: &str = "\
# credentials
BINANCE_API_KEY=dotenv-key
BINANCE_API_SECRET=dotenv-secret
MAX_QUANTITY=40
not a pair
";

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_toml_dotenv_and_env_layering() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bot.toml", TOML_CONFIG);
    write(dir.path(), ".env", DOTENV);

    let env = MapEnv::new().with("DEFAULT_SYMBOL", "BNBUSDT");
    let config = ConfigManager::load(dir.path().join("bot.toml"), dir.path().join(".env"), env);

    // file over defaults
    assert_eq!(config.get_bool("api.testnet"), Some(false));
    assert_eq!(config.get_i64("api.timeout"), Some(10));
    assert_eq!(config.get_i64("api.retry_attempts"), Some(3));
    assert_eq!(config.get_str("custom.note"), Some("kept"));

    // dotenv over file
    assert_eq!(config.get("trading.max_quantity"), Some(&ConfigValue::Int(40)));

    // pre-existing env over file
    assert_eq!(config.default_symbol(), "BNBUSDT");

    let report = config.report();
    assert_eq!(report.config_file, SourceStatus::Applied);
    assert_eq!(report.env_file, SourceStatus::Applied);
    assert_eq!(report.dotenv_vars, 3);
    assert!(report.env_overrides.contains(&"BINANCE_API_SECRET"));

    assert!(config.validate());
    let creds = config.api_credentials().unwrap();
    assert_eq!(creds.api_key, "dotenv-key");
}

#[test]
fn test_dotenv_values_land_in_the_injected_env() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".env", DOTENV);

    let config = ConfigManager::load(dir.path().join("none.json"), dir.path().join(".env"), MapEnv::new());

    assert_eq!(config.env().var("BINANCE_API_KEY").as_deref(), Some("dotenv-key"));
    assert_eq!(config.env().var("not a pair"), None);
    assert_eq!(config.report().config_file, SourceStatus::Missing);
}

#[test]
fn test_typed_limits_use_float_views() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bot.toml", TOML_CONFIG);
    let env = MapEnv::new().with("MIN_QUANTITY", "0.25");

    let config = ConfigManager::load(dir.path().join("bot.toml"), dir.path().join(".env"), env);
    let limits = config.risk_limits();

    assert_relative_eq!(limits.max_quantity, 25.5);
    assert_relative_eq!(limits.min_quantity, 0.25);
    assert_relative_eq!(limits.max_daily_trades, 50.0);
    assert_eq!(config.supported_symbols(), vec!["ETHUSDT", "SOLUSDT"]);
    assert_eq!(config.log_settings().directive(), "debug");
}

#[test]
fn test_broken_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    write(dir.path(), "config.json", "{ \"trading\": ");

    let config = ConfigManager::load(dir.path().join("config.json"), dir.path().join(".env"), MapEnv::new());

    assert!(matches!(config.report().config_file, SourceStatus::Skipped(_)));
    assert_eq!(config.default_symbol(), "BTCUSDT");
    assert_eq!(config.check(), Err(ValidationError::MissingCredentials));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_env_driven_validation_failures() {
    let dir = tempdir().unwrap();
    let base = MapEnv::new()
        .with("BINANCE_API_KEY", "k")
        .with("BINANCE_API_SECRET", "s");
    let load = |env: MapEnv| {
        ConfigManager::load(dir.path().join("config.json"), dir.path().join(".env"), env)
    };

    let config = load(base.clone().with("MAX_DAILY_TRADES", "0"));
    assert!(matches!(
        config.check(),
        Err(ValidationError::InvalidLimit { name: "max_daily_trades", .. })
    ));

    let config = load(base.clone().with("DEFAULT_SYMBOL", "BT"));
    assert!(matches!(config.check(), Err(ValidationError::InvalidSymbol(_))));

    let config = load(base.clone().with("LOG_LEVEL", "chatty"));
    assert!(matches!(config.check(), Err(ValidationError::InvalidLogLevel(_))));

    let config = load(base.with("LOG_LEVEL", "warning"));
    assert!(config.check().is_ok());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_persist_as_toml_and_reload() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bot.toml", TOML_CONFIG);
    let env = MapEnv::new()
        .with("BINANCE_API_KEY", "k")
        .with("BINANCE_API_SECRET", "s");

    let mut config = ConfigManager::load(dir.path().join("bot.toml"), dir.path().join(".env"), env);
    config.set("ui.display_precision", 4);
    let out = dir.path().join("saved").join("copy.toml");
    config.persist(&out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("display_precision = 4"));
    assert!(!text.contains("key ="));

    let reloaded = ConfigManager::load(&out, dir.path().join(".env"), MapEnv::new());
    assert_eq!(reloaded.ui_settings().display_precision, 4);
    assert_eq!(reloaded.get_str("custom.note"), Some("kept"));
    assert_eq!(reloaded.export_safe(), config.export_safe());
}

#[test]
fn test_non_finite_env_value_survives_json_round_trip() {
    let dir = tempdir().unwrap();
    let env = MapEnv::new()
        .with("BINANCE_API_KEY", "k")
        .with("BINANCE_API_SECRET", "s")
        .with("MAX_POSITION_SIZE", "inf")
        .with("DEFAULT_SYMBOL", "ETHUSDT");

    let config = ConfigManager::load(dir.path().join("config.json"), dir.path().join(".env"), env);
    assert_eq!(config.get_str("risk_management.max_position_size"), Some("inf"));
    assert!(matches!(
        config.check(),
        Err(ValidationError::InvalidLimit { name: "max_position_size", .. })
    ));

    let out = dir.path().join("saved.json");
    config.persist(&out).unwrap();

    let reloaded = ConfigManager::load(&out, dir.path().join(".env"), MapEnv::new());
    assert_eq!(reloaded.report().config_file, SourceStatus::Applied);
    assert_eq!(reloaded.get_str("trading.default_symbol"), Some("ETHUSDT"));
    assert_eq!(reloaded.export_safe(), config.export_safe());
}

#[test]
fn test_persist_refuses_non_finite_float_in_json() {
    let dir = tempdir().unwrap();
    let mut config = ConfigManager::load(dir.path().join("config.json"), dir.path().join(".env"), MapEnv::new());
    config.set("risk_management.max_position_size", f64::INFINITY);

    let out = dir.path().join("saved.json");
    assert!(config.persist(&out).is_err());
    assert!(!out.exists());
}
