//! Configuration Module
//!
//! Layered configuration resolution: defaults, a JSON/TOML file, a dotenv
//! file and environment overrides, with dotted-path access and validation.

pub mod defaults;
pub mod document;
pub mod dotenv;
pub mod env;
pub mod error;
pub mod loader;
pub mod scaffold;
pub mod settings;
pub mod value;

pub use defaults::{default_tree, DEFAULT_CONFIG_FILE, DEFAULT_ENV_FILE};
pub use env::{EnvMapping, EnvProvider, MapEnv, ProcessEnv, ENV_MAPPINGS};
pub use error::{ConfigError, ValidationError};
pub use loader::{load_config, ConfigManager, LoadReport, SourceStatus};
pub use scaffold::create_example_files;
pub use settings::{ConfigSummary, Credentials, LogSettings, RiskLimits, UiSettings};
pub use value::{coerce_env_value, ConfigTable, ConfigValue};
