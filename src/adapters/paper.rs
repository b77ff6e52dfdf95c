//! Paper Exchange
//!
//! In-memory futures venue for paper trading and dry runs. Market orders fill
//! immediately at the symbol's mark price (when one is set); limit and
//! stop-limit orders are acknowledged as `NEW` and never fill.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use crate::config::Credentials;
use crate::domain::{OrderKind, OrderReceipt, OrderRequest, OrderSide, OrderStatus};
use crate::ports::{AccountInfo, ExchangeError, FuturesExchange, PositionInfo};

#[derive(Debug, Clone)]
pub struct PaperExchange {
    credentials: Credentials,
    testnet: bool,
    symbols: HashSet<String>,
    mark_prices: BTreeMap<String, Decimal>,
    wallet_balance: Decimal,
    positions: BTreeMap<String, PositionInfo>,
    next_order_id: u64,
}

impl PaperExchange {
    pub fn new(credentials: Credentials, testnet: bool, symbols: impl IntoIterator<Item = String>) -> Self {
        Self {
            credentials,
            testnet,
            symbols: symbols.into_iter().collect(),
            mark_prices: BTreeMap::new(),
            wallet_balance: Decimal::ZERO,
            positions: BTreeMap::new(),
            next_order_id: 1,
        }
    }

    /// Builder method to set the starting wallet balance
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.wallet_balance = balance;
        self
    }

    /// Builder method to set a mark price used for market fills
    pub fn with_mark_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.mark_prices.insert(symbol.to_string(), price);
        self
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    pub fn position(&self, symbol: &str) -> Option<&PositionInfo> {
        self.positions.get(symbol)
    }

    fn authenticate(&self) -> Result<(), ExchangeError> {
        if self.credentials.api_key.is_empty() || self.credentials.api_secret.is_empty() {
            return Err(ExchangeError::Authentication(
                "API key and secret are required".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_fill(&mut self, symbol: &str, side: OrderSide, quantity: Decimal, price: Option<Decimal>) {
        let signed = match side {
            OrderSide::Buy => quantity,
            OrderSide::Sell => -quantity,
        };
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| PositionInfo {
                symbol: symbol.to_string(),
                position_amt: Decimal::ZERO,
                entry_price: Decimal::ZERO,
            });

        let old = position.position_amt;
        let new = old + signed;

        if let Some(price) = price {
            let same_direction = old.is_zero() || old.is_sign_positive() == signed.is_sign_positive();
            if same_direction {
                // weighted average entry
                position.entry_price =
                    (position.entry_price * old.abs() + price * quantity) / new.abs();
            } else if new.is_sign_positive() != old.is_sign_positive() && !new.is_zero() {
                // flipped through zero
                position.entry_price = price;
            }
        }
        if new.is_zero() {
            position.entry_price = Decimal::ZERO;
        }
        position.position_amt = new;
    }
}

impl FuturesExchange for PaperExchange {
    fn account_info(&self) -> Result<AccountInfo, ExchangeError> {
        self.authenticate()?;
        Ok(AccountInfo {
            total_wallet_balance: self.wallet_balance,
            available_balance: self.wallet_balance,
            can_trade: true,
            positions: self.positions.values().cloned().collect(),
        })
    }

    fn place_order(&mut self, request: &OrderRequest) -> Result<OrderReceipt, ExchangeError> {
        self.authenticate()?;
        if !self.symbols.contains(&request.symbol) {
            return Err(ExchangeError::Rejected(format!("Invalid symbol: {}", request.symbol)));
        }
        request
            .validate()
            .map_err(|e| ExchangeError::Rejected(e.to_string()))?;

        let order_id = self.next_order_id;
        self.next_order_id += 1;

        let (status, avg_price) = match request.kind {
            OrderKind::Market => {
                let mark = self.mark_prices.get(&request.symbol).copied();
                self.apply_fill(&request.symbol, request.side, request.quantity, mark);
                (OrderStatus::Filled, mark)
            }
            OrderKind::Limit | OrderKind::StopLimit => (OrderStatus::New, None),
        };

        tracing::info!(
            "PAPER ORDER #{} - {} {} {} {}",
            order_id,
            request.kind,
            request.side,
            request.quantity,
            request.symbol
        );

        Ok(OrderReceipt {
            order_id,
            symbol: request.symbol.clone(),
            side: request.side,
            kind: request.kind,
            quantity: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            avg_price,
            status,
            timestamp: Utc::now(),
        })
    }
}
