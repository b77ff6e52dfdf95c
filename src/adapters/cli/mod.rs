//! CLI Adapter
//!
//! Command-line interface for the futures trading bot.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod interactive;

pub use commands::{
    config_command, console_level, expand_path, write_setup_instructions, CliApp, Command,
    ConfigCmd, LimitCmd, MarketCmd, OrderArgs, StopLimitCmd,
};
pub use interactive::{Menu, Prompter};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub fn execute(app: CliApp) -> Result<()> {
    commands::execute(app)
}
