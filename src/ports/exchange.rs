//! Futures exchange port
//!
//! The trading service only talks to the exchange through this trait so that
//! the paper adapter and test doubles can stand in for a live venue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OrderReceipt, OrderRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Exchange unavailable: {0}")]
    Unavailable(String),
}

/// Open position on one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub symbol: String,
    /// Signed size; negative for shorts
    pub position_amt: Decimal,
    pub entry_price: Decimal,
}

/// Futures wallet snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub total_wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub can_trade: bool,
    pub positions: Vec<PositionInfo>,
}

impl AccountInfo {
    /// Positions with a non-zero size
    pub fn open_positions(&self) -> impl Iterator<Item = &PositionInfo> {
        self.positions.iter().filter(|p| !p.position_amt.is_zero())
    }

    /// Human readable block for the CLI
    pub fn render(&self, precision: u32) -> String {
        let fmt_dec = |d: Decimal| d.round_dp(precision).normalize().to_string();
        let mut out = format!(
            "Total Wallet Balance: {} USDT\nAvailable Balance: {} USDT\nCan Trade: {}\n",
            fmt_dec(self.total_wallet_balance),
            fmt_dec(self.available_balance),
            self.can_trade
        );

        let open: Vec<_> = self.open_positions().collect();
        if open.is_empty() {
            out.push_str("Open Positions: none");
        } else {
            out.push_str("Open Positions:");
            for p in open {
                out.push_str(&format!(
                    "\n  {}: {} @ {}",
                    p.symbol,
                    fmt_dec(p.position_amt),
                    fmt_dec(p.entry_price)
                ));
            }
        }
        out
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait FuturesExchange {
    fn account_info(&self) -> Result<AccountInfo, ExchangeError>;

    fn place_order(&mut self, request: &OrderRequest) -> Result<OrderReceipt, ExchangeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_lists_only_open_positions() {
        let info = AccountInfo {
            total_wallet_balance: dec!(1000.123456),
            available_balance: dec!(900),
            can_trade: true,
            positions: vec![
                PositionInfo {
                    symbol: "BTCUSDT".to_string(),
                    position_amt: dec!(-0.5),
                    entry_price: dec!(50000),
                },
                PositionInfo {
                    symbol: "ETHUSDT".to_string(),
                    position_amt: dec!(0),
                    entry_price: dec!(0),
                },
            ],
        };

        let rendered = info.render(2);
        assert!(rendered.contains("Total Wallet Balance: 1000.12 USDT"));
        assert!(rendered.contains("BTCUSDT: -0.5 @ 50000"));
        assert!(!rendered.contains("ETHUSDT"));
    }
}
