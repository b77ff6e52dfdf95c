//! Domain Layer - Order types with no external dependencies
//!
//! All exchange interaction happens through the ports layer.

pub mod order;

pub use order::{
    normalize_symbol, OrderError, OrderKind, OrderReceipt, OrderRequest, OrderSide, OrderStatus,
};
