//! Futures Bot - Binance Futures Trading Bot
//!
//! Command-line entry point; all behaviour lives in the library.

use anyhow::Result;
use futures_bot::adapters::cli;

fn main() -> Result<()> {
    let app = cli::init();
    cli::execute(app)
}
