//! Example configuration files for first-time setup

use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::default_tree;
use super::document::write_document;
use super::error::ConfigError;

pub const ENV_EXAMPLE_FILE: &str = ".env.example";
pub const CONFIG_EXAMPLE_FILE: &str = "config.example.json";

const ENV_EXAMPLE: &str = "\
# Binance API Configuration
BINANCE_API_KEY=your_api_key_here
BINANCE_API_SECRET=your_api_secret_here
BINANCE_TESTNET=true

# Trading Configuration
DEFAULT_SYMBOL=BTCUSDT
MAX_QUANTITY=1000
MIN_QUANTITY=0.001

# Logging Configuration
LOG_LEVEL=INFO
MAX_LOG_SIZE=10485760
LOG_BACKUP_COUNT=5

# Risk Management
MAX_DAILY_TRADES=50
MAX_POSITION_SIZE=100
ENABLE_STOP_LOSS=true
";

/// Write `.env.example` and `config.example.json` into `dir`.
///
/// Existing files are left untouched. Returns the paths that were created.
pub fn create_example_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;
    let mut created = Vec::new();

    let env_example = dir.join(ENV_EXAMPLE_FILE);
    if !env_example.exists() {
        fs::write(&env_example, ENV_EXAMPLE).map_err(|e| ConfigError::io(&env_example, e))?;
        tracing::info!("Created {}", env_example.display());
        created.push(env_example);
    }

    let config_example = dir.join(CONFIG_EXAMPLE_FILE);
    if !config_example.exists() {
        write_document(&config_example, &default_tree())?;
        tracing::info!("Created {}", config_example.display());
        created.push(config_example);
    }

    Ok(created)
}
