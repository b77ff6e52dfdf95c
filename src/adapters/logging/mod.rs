//! Logging adapter: rotating log files and the trade journal

pub mod rotating;
pub mod trade_logger;

pub use rotating::RotatingFile;
pub use trade_logger::{
    LogFileStats, LoggingError, TradeLogger, DEFAULT_LOG_DIR, ERROR_LOG_FILE, MAIN_LOG_FILE,
    TRADE_LOG_FILE,
};
