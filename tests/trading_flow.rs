//! Trading Flow Integration Tests
//!
//! Config -> logger -> paper exchange -> trading service, end to end.
//! All tests are deterministic and write only to temporary directories.

use futures_bot::adapters::logging::{LogFileStats, TradeLogger, TRADE_LOG_FILE};
use futures_bot::adapters::paper::PaperExchange;
use futures_bot::application::{OrderBounds, ServiceError, TradingService};
use futures_bot::config::{ConfigManager, MapEnv};
use futures_bot::domain::{OrderError, OrderRequest, OrderSide, OrderStatus};
use futures_bot::ports::{ExchangeError, FuturesExchange};
use rust_decimal_macros::dec;
use std::fs;
use tempfile::tempdir;

fn config(dir: &std::path::Path, extra: &[(&str, &str)]) -> ConfigManager<MapEnv> {
    let mut env = MapEnv::new()
        .with("BINANCE_API_KEY", "paper-key")
        .with("BINANCE_API_SECRET", "paper-secret")
        .with("MAX_QUANTITY", "2");
    for (k, v) in extra {
        env = env.with(k, v);
    }
    ConfigManager::load(dir.join("config.json"), dir.join(".env"), env)
}

fn paper(config: &ConfigManager<MapEnv>) -> PaperExchange {
    PaperExchange::new(
        config.api_credentials().unwrap(),
        config.is_testnet(),
        config.supported_symbols(),
    )
    .with_balance(dec!(1000))
    .with_mark_price("BTCUSDT", dec!(65000))
}

#[test]
fn test_orders_flow_through_to_the_journal() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), &[]);
    assert!(config.validate());

    let logger = TradeLogger::new(config.log_settings(), dir.path().join("logs")).unwrap();
    let bounds = OrderBounds::from_limits(&config.risk_limits());
    let mut service = TradingService::new(paper(&config), &logger, bounds);

    let account = service.connect(config.is_testnet()).unwrap();
    assert_eq!(account.total_wallet_balance, dec!(1000));

    let market = service
        .place(&OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(1.5)))
        .unwrap();
    assert_eq!(market.status, OrderStatus::Filled);

    let stop = service
        .place(&OrderRequest::stop_limit(
            "ETHUSDT",
            OrderSide::Sell,
            dec!(1),
            dec!(3000),
            dec!(3010),
        ))
        .unwrap();
    assert_eq!(stop.status, OrderStatus::New);
    assert_eq!(stop.order_id, market.order_id + 1);

    let journal = fs::read_to_string(dir.path().join("logs").join(TRADE_LOG_FILE)).unwrap();
    let lines: Vec<&str> = journal.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"type\":\"MARKET_ORDER\""));
    assert!(lines[1].contains("\"type\":\"STOP_LIMIT_ORDER\""));
    assert!(lines[1].contains("\"order_type\":\"STOP\""));
    assert!(lines[1].contains("\"stop_price\":\"3010\""));

    let info = service.exchange().account_info().unwrap();
    assert_eq!(info.open_positions().count(), 1);

    match &logger.stats()[TRADE_LOG_FILE] {
        LogFileStats::Present { size_bytes, .. } => assert!(*size_bytes > 0),
        other => panic!("trade log missing: {:?}", other),
    }
}

#[test]
fn test_configured_bounds_reject_large_orders() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), &[]);
    let logger = TradeLogger::new(config.log_settings(), dir.path()).unwrap();
    let mut service = TradingService::new(
        paper(&config),
        &logger,
        OrderBounds::from_limits(&config.risk_limits()),
    );

    let err = service
        .place(&OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(3)))
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Order(OrderError::QuantityOutOfRange { .. })
    ));
    assert!(service.exchange().position("BTCUSDT").is_none());
}

#[test]
fn test_unsupported_symbol_is_rejected_by_exchange() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), &[]);
    let logger = TradeLogger::new(config.log_settings(), dir.path()).unwrap();
    let mut service = TradingService::new(paper(&config), &logger, OrderBounds::default());

    let err = service
        .place(&OrderRequest::limit("XRPUSDT", OrderSide::Buy, dec!(1), dec!(0.5)))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Exchange(ExchangeError::Rejected(_))));
}

#[test]
fn test_trade_logging_can_be_disabled_from_config() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), &[]);
    config.set("logging.enable_trade_logging", false);

    let logger = TradeLogger::new(config.log_settings(), dir.path().join("logs")).unwrap();
    let mut service = TradingService::new(paper(&config), &logger, OrderBounds::default());
    service
        .place(&OrderRequest::market("BTCUSDT", OrderSide::Sell, dec!(0.01)))
        .unwrap();

    assert!(!dir.path().join("logs").join(TRADE_LOG_FILE).exists());
}
