//! Order types and input normalisation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Invalid order side: {0}. Must be 'BUY' or 'SELL'")]
    InvalidSide(String),

    #[error("Invalid order type: {0}. Must be one of MARKET, LIMIT, STOP-LIMIT")]
    InvalidKind(String),

    #[error("Trading pair cannot be empty")]
    EmptySymbol,

    #[error("{kind} orders require a {field}")]
    MissingField { kind: OrderKind, field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("Quantity {quantity} outside allowed range {min}..={max}")]
    QuantityOutOfRange {
        quantity: Decimal,
        min: Decimal,
        max: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl FromStr for OrderSide {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(OrderError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("BUY"),
            OrderSide::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit,
    StopLimit,
}

impl OrderKind {
    /// Type name the exchange expects
    pub fn exchange_type(&self) -> &'static str {
        match self {
            OrderKind::Market => "MARKET",
            OrderKind::Limit => "LIMIT",
            OrderKind::StopLimit => "STOP",
        }
    }

    /// Entry type written to the trade journal
    pub fn journal_label(&self) -> &'static str {
        match self {
            OrderKind::Market => "MARKET_ORDER",
            OrderKind::Limit => "LIMIT_ORDER",
            OrderKind::StopLimit => "STOP_LIMIT_ORDER",
        }
    }

    pub fn requires_price(&self) -> bool {
        !matches!(self, OrderKind::Market)
    }

    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderKind::StopLimit)
    }
}

impl FromStr for OrderKind {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderKind::Market),
            "LIMIT" => Ok(OrderKind::Limit),
            "STOP-LIMIT" | "STOP_LIMIT" => Ok(OrderKind::StopLimit),
            other => Err(OrderError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => f.write_str("MARKET"),
            OrderKind::Limit => f.write_str("LIMIT"),
            OrderKind::StopLimit => f.write_str("STOP-LIMIT"),
        }
    }
}

/// Upper-case and trim a trading pair. Pairs that are not USDT-margined are
/// accepted with a warning.
pub fn normalize_symbol(raw: &str) -> Result<String, OrderError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(OrderError::EmptySymbol);
    }
    if !symbol.ends_with("USDT") {
        tracing::warn!("{} doesn't end with USDT. This might not be a valid futures pair.", symbol);
    }
    Ok(symbol)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Market,
            quantity,
            price: None,
            stop_price: None,
        }
    }

    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
        }
    }

    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::StopLimit,
            quantity,
            price: Some(price),
            stop_price: Some(stop_price),
        }
    }

    /// Structural checks: symbol present, positive quantity, prices the kind needs
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderError::EmptySymbol);
        }
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::NonPositive {
                field: "quantity",
                value: self.quantity,
            });
        }

        check_price(self.kind, "price", self.price, self.kind.requires_price())?;
        check_price(self.kind, "stop price", self.stop_price, self.kind.requires_stop_price())?;
        Ok(())
    }

    /// Request parameters in exchange naming, for request logging
    pub fn to_params(&self) -> serde_json::Value {
        let mut params = serde_json::json!({
            "symbol": self.symbol,
            "side": self.side.to_string(),
            "type": self.kind.exchange_type(),
            "quantity": self.quantity.to_string(),
        });
        if let Some(price) = self.price {
            params["price"] = price.to_string().into();
        }
        if let Some(stop) = self.stop_price {
            params["stopPrice"] = stop.to_string().into();
        }
        params
    }

    /// Pre-submit confirmation block
    pub fn confirmation(&self) -> String {
        let rule = "-".repeat(40);
        let mut out = format!(
            "{rule}\nORDER CONFIRMATION\n{rule}\nType: {}\nSymbol: {}\nSide: {}\nQuantity: {}\n",
            self.kind, self.symbol, self.side, self.quantity
        );
        if let Some(price) = self.price {
            out.push_str(&format!("Price: {}\n", price));
        }
        if let Some(stop) = self.stop_price {
            out.push_str(&format!("Stop Price: {}\n", stop));
        }
        out.push_str(&rule);
        out
    }
}

fn check_price(
    kind: OrderKind,
    field: &'static str,
    value: Option<Decimal>,
    required: bool,
) -> Result<(), OrderError> {
    match value {
        None if required => Err(OrderError::MissingField { kind, field }),
        Some(v) if v <= Decimal::ZERO => Err(OrderError::NonPositive { field, value: v }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Expired => "EXPIRED",
        };
        f.write_str(label)
    }
}

/// Exchange acknowledgement of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: u64,
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    /// Average fill price, when filled
    pub avg_price: Option<Decimal>,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl OrderReceipt {
    /// Execution summary block with decimals rounded to `precision` places
    pub fn summary(&self, precision: u32) -> String {
        let rule = "=".repeat(50);
        let fmt_dec = |d: Decimal| d.round_dp(precision).normalize().to_string();

        let mut out = format!(
            "{rule}\nORDER EXECUTION SUMMARY\n{rule}\nOrder ID: {}\nSymbol: {}\nSide: {}\nType: {}\nQuantity: {}\n",
            self.order_id,
            self.symbol,
            self.side,
            self.kind,
            fmt_dec(self.quantity)
        );
        if let Some(price) = self.price {
            out.push_str(&format!("Price: {}\n", fmt_dec(price)));
        }
        if let Some(stop) = self.stop_price {
            out.push_str(&format!("Stop Price: {}\n", fmt_dec(stop)));
        }
        if let Some(avg) = self.avg_price {
            out.push_str(&format!("Avg Fill Price: {}\n", fmt_dec(avg)));
        }
        out.push_str(&format!(
            "Status: {}\nTimestamp: {}\n{rule}",
            self.status,
            self.timestamp.to_rfc3339()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_parsing() {
        assert_eq!("buy".parse::<OrderSide>(), Ok(OrderSide::Buy));
        assert_eq!(" SELL ".parse::<OrderSide>(), Ok(OrderSide::Sell));
        assert_eq!("hold".parse::<OrderSide>(), Err(OrderError::InvalidSide("HOLD".to_string())));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("market".parse::<OrderKind>(), Ok(OrderKind::Market));
        assert_eq!("stop-limit".parse::<OrderKind>(), Ok(OrderKind::StopLimit));
        assert_eq!("STOP_LIMIT".parse::<OrderKind>(), Ok(OrderKind::StopLimit));
        assert!("oco".parse::<OrderKind>().is_err());
        assert_eq!(OrderKind::StopLimit.exchange_type(), "STOP");
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" btcusdt "), Ok("BTCUSDT".to_string()));
        // accepted with a warning
        assert_eq!(normalize_symbol("ethbtc"), Ok("ETHBTC".to_string()));
        assert_eq!(normalize_symbol("   "), Err(OrderError::EmptySymbol));
    }

    #[test]
    fn test_validate_requires_prices_by_kind() {
        assert!(OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.01)).validate().is_ok());

        let mut limit = OrderRequest::limit("BTCUSDT", OrderSide::Sell, dec!(1), dec!(50000));
        assert!(limit.validate().is_ok());
        limit.price = None;
        assert_eq!(
            limit.validate(),
            Err(OrderError::MissingField { kind: OrderKind::Limit, field: "price" })
        );

        let stop = OrderRequest::stop_limit("BTCUSDT", OrderSide::Buy, dec!(1), dec!(100), dec!(0));
        assert!(matches!(stop.validate(), Err(OrderError::NonPositive { field: "stop price", .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        let order = OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0));
        assert!(matches!(order.validate(), Err(OrderError::NonPositive { field: "quantity", .. })));
    }

    #[test]
    fn test_params_use_exchange_names() {
        let order = OrderRequest::stop_limit("BTCUSDT", OrderSide::Buy, dec!(0.5), dec!(100), dec!(95));
        let params = order.to_params();
        assert_eq!(params["type"], "STOP");
        assert_eq!(params["stopPrice"], "95");
        assert_eq!(params["quantity"], "0.5");
    }

    #[test]
    fn test_summary_rounds_to_precision() {
        let receipt = OrderReceipt {
            order_id: 7,
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Buy,
            kind: OrderKind::Limit,
            quantity: dec!(0.123456789),
            price: Some(dec!(50000.00)),
            stop_price: None,
            avg_price: None,
            status: OrderStatus::New,
            timestamp: Utc::now(),
        };

        let summary = receipt.summary(4);
        assert!(summary.contains("Order ID: 7"));
        assert!(summary.contains("Quantity: 0.1235"));
        assert!(summary.contains("Price: 50000\n"));
        assert!(summary.contains("Status: NEW"));
        assert!(!summary.contains("Stop Price"));
    }
}
