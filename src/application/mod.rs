pub mod trading_service;

pub use trading_service::{OrderBounds, ServiceError, TradingService};
