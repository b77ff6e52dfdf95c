//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the futures trading bot.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use super::interactive::{Menu, Prompter};
use crate::adapters::logging::{TradeLogger, DEFAULT_LOG_DIR};
use crate::adapters::paper::PaperExchange;
use crate::application::{OrderBounds, TradingService};
use crate::config::value::lookup;
use crate::config::{
    coerce_env_value, create_example_files, load_config, ConfigManager, DEFAULT_CONFIG_FILE,
    DEFAULT_ENV_FILE,
};
use crate::domain::{normalize_symbol, OrderKind, OrderRequest, OrderSide};

/// Starting wallet balance of the paper venue, in USDT
const PAPER_BALANCE_USDT: i64 = 10_000;

/// Binance Futures trading bot with layered configuration
#[derive(Parser, Debug)]
#[command(
    name = "futures-bot",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Binance Futures trading bot",
    long_about = "Places market, limit and stop-limit futures orders from an interactive \
                  menu or one-shot commands. Settings resolve from built-in defaults, a \
                  JSON/TOML config file, a .env file and environment variables."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (.json or .toml)
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Path to dotenv file
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_ENV_FILE)]
    pub env_file: String,

    /// Directory for log files
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive trading menu
    Run,

    /// Place a market order
    Market(MarketCmd),

    /// Place a limit order
    Limit(LimitCmd),

    /// Place a stop-limit order
    StopLimit(StopLimitCmd),

    /// Show account balance and open positions
    Account,

    /// Inspect or edit configuration
    #[command(subcommand)]
    Config(ConfigCmd),
}

/// Arguments shared by every order command
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Order side (BUY or SELL)
    #[arg(value_name = "SIDE")]
    pub side: OrderSide,

    /// Order quantity
    #[arg(value_name = "QUANTITY")]
    pub quantity: Decimal,

    /// Trading pair (defaults to trading.default_symbol)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct MarketCmd {
    #[command(flatten)]
    pub order: OrderArgs,
}

#[derive(Args, Debug)]
pub struct LimitCmd {
    #[command(flatten)]
    pub order: OrderArgs,

    /// Limit price
    #[arg(long, value_name = "PRICE")]
    pub price: Decimal,
}

#[derive(Args, Debug)]
pub struct StopLimitCmd {
    #[command(flatten)]
    pub order: OrderArgs,

    /// Limit price
    #[arg(long, value_name = "PRICE")]
    pub price: Decimal,

    /// Trigger price
    #[arg(long, value_name = "PRICE")]
    pub stop_price: Decimal,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Print a credential-free summary
    Show,

    /// Validate the configuration; exits non-zero on failure
    Validate,

    /// Print the value at a dotted path (e.g. trading.max_quantity)
    Get {
        path: String,
    },

    /// Set a dotted path; the value is coerced like an environment variable
    Set {
        path: String,
        value: String,

        /// Write the result back to the config file
        #[arg(long)]
        save: bool,
    },

    /// Write .env.example and config.example.json
    Init {
        /// Target directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: String,
    },
}

/// Expand `~` and environment references in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Console log level for the CLI flags
pub fn console_level(verbose: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Execute the parsed command line
pub fn execute(app: CliApp) -> Result<()> {
    let config_path = expand_path(&app.config);
    let env_path = expand_path(&app.env_file);
    let log_dir = expand_path(&app.log_dir);
    let console = console_level(app.verbose, app.debug);

    // trading commands install file logging once the config is known
    if let Command::Config(_) = app.command {
        init_logging(console);
    }
    let mut config = load_config(config_path, env_path);
    let ui = config.ui_settings();

    match app.command {
        Command::Config(cmd) => config_command(cmd, &mut config, &mut io::stdout().lock()),
        Command::Run => with_session(&config, log_dir, console, |service, prompter| {
            Menu::new(service, ui, config.default_symbol(), prompter).run()?;
            Ok(())
        }),
        Command::Account => with_session(&config, log_dir, console, |service, _| {
            let info = service.account_info()?;
            println!("{}", info.render(ui.display_precision));
            Ok(())
        }),
        Command::Market(cmd) => {
            let confirm = ui.show_confirmations && !cmd.order.yes;
            let request = build_request(OrderKind::Market, cmd.order, None, None, &config)?;
            with_session(&config, log_dir, console, |service, prompter| {
                one_shot(service, &request, confirm, ui.display_precision, prompter)
            })
        }
        Command::Limit(cmd) => {
            let confirm = ui.show_confirmations && !cmd.order.yes;
            let request =
                build_request(OrderKind::Limit, cmd.order, Some(cmd.price), None, &config)?;
            with_session(&config, log_dir, console, |service, prompter| {
                one_shot(service, &request, confirm, ui.display_precision, prompter)
            })
        }
        Command::StopLimit(cmd) => {
            let confirm = ui.show_confirmations && !cmd.order.yes;
            let request = build_request(
                OrderKind::StopLimit,
                cmd.order,
                Some(cmd.price),
                Some(cmd.stop_price),
                &config,
            )?;
            with_session(&config, log_dir, console, |service, prompter| {
                one_shot(service, &request, confirm, ui.display_precision, prompter)
            })
        }
    }
}

/// Console-only logging for commands that do not trade
fn init_logging(console: LevelFilter) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console.to_string().to_lowercase()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Handle `config` subcommands
pub fn config_command<E, W>(cmd: ConfigCmd, config: &mut ConfigManager<E>, out: &mut W) -> Result<()>
where
    E: crate::config::EnvProvider,
    W: Write,
{
    match cmd {
        ConfigCmd::Show => {
            let summary = serde_json::to_string_pretty(&config.summary())?;
            let report = serde_json::to_string_pretty(config.report())?;
            writeln!(out, "{}", summary)?;
            writeln!(out, "Sources: {}", report)?;
        }
        ConfigCmd::Validate => {
            if let Err(e) = config.check() {
                tracing::error!("Configuration validation failed: {}", e);
                write_setup_instructions(out)?;
                bail!("Configuration validation failed: {}", e);
            }
            writeln!(out, "Configuration is valid")?;
        }
        ConfigCmd::Get { path } => {
            let safe = config.export_safe();
            let Some(value) = lookup(&safe, &path) else {
                bail!("No value at '{}'", path);
            };
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        }
        ConfigCmd::Set { path, value, save } => {
            let value = coerce_env_value(&value);
            writeln!(out, "{} = {}", path, serde_json::to_string(&value)?)?;
            config.set(&path, value);

            if save {
                config
                    .save()
                    .with_context(|| format!("Failed to save {}", config.config_path().display()))?;
                writeln!(out, "Saved to {}", config.config_path().display())?;
            } else {
                writeln!(out, "Not saved (pass --save to write {})", config.config_path().display())?;
            }
        }
        ConfigCmd::Init { dir } => {
            let dir = expand_path(&dir);
            let created = create_example_files(&dir)?;
            if created.is_empty() {
                writeln!(out, "Example files already exist in {}", dir.display())?;
            }
            for path in created {
                writeln!(out, "Created {}", path.display())?;
            }
        }
    }
    Ok(())
}

/// Setup help shown when credentials or settings are invalid
pub fn write_setup_instructions<W: Write>(out: &mut W) -> io::Result<()> {
    let rule = "=".repeat(60);
    writeln!(
        out,
        "\n{rule}\nSETUP INSTRUCTIONS\n{rule}\n\
         1. Get your API credentials from Binance Futures Testnet:\n   \
            https://testnet.binancefuture.com\n\n\
         2. Set environment variables:\n   \
            export BINANCE_API_KEY='your_api_key_here'\n   \
            export BINANCE_API_SECRET='your_api_secret_here'\n\n\
         3. Or create a .env file with:\n   \
            BINANCE_API_KEY=your_api_key_here\n   \
            BINANCE_API_SECRET=your_api_secret_here\n\n\
         Run `futures-bot config init` to write example files.\n{rule}"
    )
}

/// Startup sequence shared by every trading command: logging, validation,
/// exchange connection. `action` runs against the connected service.
fn with_session<F>(config: &ConfigManager, log_dir: PathBuf, console: LevelFilter, action: F) -> Result<()>
where
    F: FnOnce(&mut TradingService<'_, PaperExchange>, Prompter<io::StdinLock<'static>, io::Stdout>) -> Result<()>,
{
    let logger = TradeLogger::new(config.log_settings(), log_dir)
        .context("Failed to initialise logging")?;
    logger.install(console)?;
    config.report().log_problems();
    tracing::info!("Configuration sources: {:?}", config.report());
    logger.log_system_event(
        "CLI startup",
        Some(&serde_json::json!({ "config": config.summary() })),
    );

    if !config.validate() {
        println!("Configuration validation failed. Please check your API credentials.");
        write_setup_instructions(&mut io::stdout().lock())?;
        bail!("Invalid configuration");
    }

    let credentials = config.api_credentials()?;
    let testnet = config.is_testnet();
    let exchange = PaperExchange::new(credentials, testnet, config.supported_symbols())
        .with_balance(Decimal::from(PAPER_BALANCE_USDT));
    let mut service = TradingService::new(
        exchange,
        &logger,
        OrderBounds::from_limits(&config.risk_limits()),
    );

    let account = service
        .connect(testnet)
        .context("Failed to connect to exchange")?;
    println!(
        "Connected to Binance {} successfully!",
        if testnet { "Testnet" } else { "Live" }
    );
    println!("Account Balance: {} USDT", account.total_wallet_balance);
    logger.log_system_event(
        "Bot connection established",
        Some(&serde_json::json!({
            "testnet": testnet,
            "balance": account.total_wallet_balance.to_string(),
        })),
    );

    let prompter = Prompter::new(io::stdin().lock(), io::stdout());
    let result = action(&mut service, prompter);
    logger.log_system_event("CLI shutdown", None);
    result
}

fn build_request(
    kind: OrderKind,
    args: OrderArgs,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    config: &ConfigManager,
) -> Result<OrderRequest> {
    let symbol = normalize_symbol(&args.symbol.unwrap_or_else(|| config.default_symbol()))?;
    Ok(OrderRequest {
        symbol,
        side: args.side,
        kind,
        quantity: args.quantity,
        price,
        stop_price,
    })
}

/// Confirm (unless skipped) and place a single order
fn one_shot<E, R, W>(
    service: &mut TradingService<'_, E>,
    request: &OrderRequest,
    confirm: bool,
    precision: u32,
    mut prompter: Prompter<R, W>,
) -> Result<()>
where
    E: crate::ports::FuturesExchange,
    R: io::BufRead,
    W: Write,
{
    if confirm {
        prompter.say(&request.confirmation())?;
        if prompter.confirm("Confirm order? (y/n): ")? != Some(true) {
            prompter.say("Order cancelled.")?;
            return Ok(());
        }
    }

    let receipt = service.place(request)?;
    prompter.say(&receipt.summary(precision))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapEnv};
    use std::fs;
    use tempfile::tempdir;

    fn manager(dir: &std::path::Path) -> ConfigManager<MapEnv> {
        let env = MapEnv::new()
            .with("BINANCE_API_KEY", "key")
            .with("BINANCE_API_SECRET", "secret");
        ConfigManager::load(dir.join("config.json"), dir.join(".env"), env)
    }

    fn run(cmd: ConfigCmd, config: &mut ConfigManager<MapEnv>) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = config_command(cmd, config, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_parses_order_command() {
        let app = CliApp::try_parse_from([
            "futures-bot",
            "--config",
            "bot.toml",
            "stop-limit",
            "sell",
            "0.5",
            "--price",
            "100",
            "--stop-price",
            "101",
            "--yes",
        ])
        .unwrap();

        assert_eq!(app.config, "bot.toml");
        assert_eq!(app.env_file, DEFAULT_ENV_FILE);
        match app.command {
            Command::StopLimit(cmd) => {
                assert_eq!(cmd.order.side, OrderSide::Sell);
                assert!(cmd.order.yes);
                assert_eq!(cmd.stop_price, Decimal::from(101));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_side() {
        assert!(CliApp::try_parse_from(["futures-bot", "market", "hold", "1"]).is_err());
    }

    #[test]
    fn test_console_level() {
        assert_eq!(console_level(false, false), LevelFilter::WARN);
        assert_eq!(console_level(true, false), LevelFilter::INFO);
        assert_eq!(console_level(true, true), LevelFilter::DEBUG);
    }

    #[test]
    fn test_config_show_hides_credentials() {
        let dir = tempdir().unwrap();
        let mut config = manager(dir.path());
        let (result, out) = run(ConfigCmd::Show, &mut config);

        result.unwrap();
        assert!(out.contains("\"has_credentials\": true"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_config_validate_fails_without_credentials() {
        let dir = tempdir().unwrap();
        let mut config = ConfigManager::load(
            dir.path().join("config.json"),
            dir.path().join(".env"),
            MapEnv::new(),
        );
        let (result, out) = run(ConfigCmd::Validate, &mut config);

        assert!(result.is_err());
        assert!(out.contains("SETUP INSTRUCTIONS"));
    }

    #[test]
    fn test_config_get_never_reveals_secret() {
        let dir = tempdir().unwrap();
        let mut config = manager(dir.path());

        let (result, out) = run(ConfigCmd::Get { path: "trading.default_symbol".into() }, &mut config);
        result.unwrap();
        assert_eq!(out.trim(), "\"BTCUSDT\"");

        let (result, _) = run(ConfigCmd::Get { path: "api.secret".into() }, &mut config);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_set_and_save() {
        let dir = tempdir().unwrap();
        let mut config = manager(dir.path());
        let cmd = ConfigCmd::Set {
            path: "trading.max_quantity".into(),
            value: "250".into(),
            save: true,
        };
        let (result, out) = run(cmd, &mut config);

        result.unwrap();
        assert!(out.contains("trading.max_quantity = 250"));
        assert_eq!(config.get("trading.max_quantity"), Some(&ConfigValue::Int(250)));

        let saved = fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(saved.contains("\"max_quantity\": 250"));
        assert!(!saved.contains("secret"));
    }

    #[test]
    fn test_config_init_writes_examples() {
        let dir = tempdir().unwrap();
        let mut config = manager(dir.path());
        let target = dir.path().join("setup");
        let cmd = ConfigCmd::Init { dir: target.display().to_string() };
        let (result, out) = run(cmd, &mut config);

        result.unwrap();
        assert!(out.contains(".env.example"));
        assert!(target.join("config.example.json").exists());
    }
}
