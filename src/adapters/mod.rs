//! Adapters Layer - External System Implementations
//!
//! - Logging: rotating log files, trade journal and subscriber setup
//! - Paper: in-memory futures exchange
//! - CLI: command-line interface handlers

pub mod cli;
pub mod logging;
pub mod paper;

pub use cli::CliApp;
pub use logging::TradeLogger;
pub use paper::PaperExchange;
