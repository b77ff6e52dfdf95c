use std::path::PathBuf;
use thiserror::Error;

use super::value::{ConfigValue, UnsupportedValue};

/// File-level failures while reading or writing configuration sources
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error(transparent)]
    UnsupportedValue(#[from] UnsupportedValue),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

/// First failed rule of a validation pass
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "API credentials not found. Set BINANCE_API_KEY and BINANCE_API_SECRET \
         environment variables or add them to your config"
    )]
    MissingCredentials,

    #[error("Invalid {name}: {value}")]
    InvalidLimit {
        name: &'static str,
        value: ConfigValue,
    },

    #[error("Invalid default symbol: {0}")]
    InvalidSymbol(ConfigValue),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(ConfigValue),
}
