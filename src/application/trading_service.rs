//! Trading Service
//!
//! Validates orders against the configured quantity bounds, submits them to
//! the exchange port and records every step through the trade logger.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::adapters::logging::TradeLogger;
use crate::config::RiskLimits;
use crate::domain::{OrderError, OrderKind, OrderReceipt, OrderRequest};
use crate::ports::{AccountInfo, ExchangeError, FuturesExchange};

const ACCOUNT_ENDPOINT: &str = "futures_account";
const ORDER_ENDPOINT: &str = "futures_create_order";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid order: {0}")]
    Order(#[from] OrderError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Allowed order quantity range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBounds {
    pub min_quantity: Decimal,
    pub max_quantity: Decimal,
}

impl Default for OrderBounds {
    fn default() -> Self {
        Self {
            min_quantity: Decimal::new(1, 3),
            max_quantity: Decimal::from(1000),
        }
    }
}

impl OrderBounds {
    /// Bounds from the configured limits; non-finite values keep the defaults
    pub fn from_limits(limits: &RiskLimits) -> Self {
        let defaults = Self::default();
        Self {
            min_quantity: to_decimal(limits.min_quantity).unwrap_or(defaults.min_quantity),
            max_quantity: to_decimal(limits.max_quantity).unwrap_or(defaults.max_quantity),
        }
    }

    pub fn check(&self, quantity: Decimal) -> Result<(), OrderError> {
        if quantity < self.min_quantity || quantity > self.max_quantity {
            return Err(OrderError::QuantityOutOfRange {
                quantity,
                min: self.min_quantity,
                max: self.max_quantity,
            });
        }
        Ok(())
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_str(&value.to_string()).ok()
}

fn operation(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Market => "place_market_order",
        OrderKind::Limit => "place_limit_order",
        OrderKind::StopLimit => "place_stop_limit_order",
    }
}

fn order_label(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Market => "market",
        OrderKind::Limit => "limit",
        OrderKind::StopLimit => "stop-limit",
    }
}

fn completed_event(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Market => "Market order completed",
        OrderKind::Limit => "Limit order completed",
        OrderKind::StopLimit => "Stop-limit order completed",
    }
}

pub struct TradingService<'a, E> {
    exchange: E,
    logger: &'a TradeLogger,
    bounds: OrderBounds,
}

impl<'a, E: FuturesExchange> TradingService<'a, E> {
    pub fn new(exchange: E, logger: &'a TradeLogger, bounds: OrderBounds) -> Self {
        Self {
            exchange,
            logger,
            bounds,
        }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub fn bounds(&self) -> &OrderBounds {
        &self.bounds
    }

    /// Verify the exchange accepts our credentials by fetching the account
    pub fn connect(&self, testnet: bool) -> Result<AccountInfo, ServiceError> {
        self.logger.log_system_event(
            "Bot initialized",
            Some(&serde_json::json!({
                "testnet": testnet,
                "timestamp": chrono::Local::now().to_rfc3339(),
            })),
        );
        self.account_info()
    }

    pub fn account_info(&self) -> Result<AccountInfo, ServiceError> {
        let params = serde_json::json!({});
        self.logger.log_api_request(ACCOUNT_ENDPOINT, &params, "REQUEST_SENT");

        match self.exchange.account_info() {
            Ok(info) => {
                self.logger.log_api_request(ACCOUNT_ENDPOINT, &params, "SUCCESS");
                self.logger.log_system_event(
                    "Account info retrieved",
                    Some(&serde_json::json!({
                        "balance": info.total_wallet_balance.to_string(),
                    })),
                );
                Ok(info)
            }
            Err(e) => {
                self.logger
                    .log_api_request(ACCOUNT_ENDPOINT, &params, &format!("API_ERROR: {}", e));
                self.logger.log_error(&e, "get_account_info");
                Err(e.into())
            }
        }
    }

    /// Validate and submit an order
    pub fn place(&mut self, request: &OrderRequest) -> Result<OrderReceipt, ServiceError> {
        if let Err(e) = request.validate().and_then(|_| self.bounds.check(request.quantity)) {
            self.logger.log_error(&e, "validate_order_params");
            return Err(e.into());
        }

        let context = operation(request.kind);
        let label = order_label(request.kind);
        let params = request.to_params();

        self.logger.log_api_request(ORDER_ENDPOINT, &params, "REQUEST_SENT");
        self.logger
            .log_system_event(&format!("Placing {} order", label), Some(&params));

        match self.exchange.place_order(request) {
            Ok(receipt) => {
                self.logger.log_api_request(ORDER_ENDPOINT, &params, "SUCCESS");
                if let Err(e) = self.logger.log_trade(&receipt, request.kind.journal_label()) {
                    tracing::warn!("Failed to journal order {}: {}", receipt.order_id, e);
                }
                let details = serde_json::to_value(&receipt).unwrap_or_default();
                self.logger.log_system_event(
                    completed_event(request.kind),
                    Some(&details),
                );
                Ok(receipt)
            }
            Err(e) => {
                let status = match e {
                    ExchangeError::Rejected(_) => "ORDER_ERROR",
                    _ => "API_ERROR",
                };
                self.logger
                    .log_api_request(ORDER_ENDPOINT, &params, &format!("{}: {}", status, e));
                self.logger.log_error(&e, context);
                Err(e.into())
            }
        }
    }
}
