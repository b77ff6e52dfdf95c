//! Ports Layer - Trait definitions for external dependencies

pub mod exchange;

pub use exchange::{AccountInfo, ExchangeError, FuturesExchange, PositionInfo};

#[cfg(test)]
pub use exchange::MockFuturesExchange;
