//! Futures Bot - Binance Futures Trading Bot Library
//!
//! Places market, limit and stop-limit futures orders behind a layered
//! configuration resolver.
//!
//! # Modules
//!
//! - `config`: Layered configuration (defaults, JSON/TOML file, dotenv, environment)
//! - `domain`: Order types and input normalisation
//! - `ports`: Exchange trait abstraction (FuturesExchange)
//! - `adapters`: External implementations (logging, paper exchange, CLI)
//! - `application`: Trading service

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
