//! Interactive menu
//!
//! Line-oriented prompts over any `BufRead`/`Write` pair. End of input at any
//! prompt ends the session.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::application::TradingService;
use crate::config::UiSettings;
use crate::domain::{normalize_symbol, OrderKind, OrderRequest, OrderSide};
use crate::ports::FuturesExchange;

const MIN_PRICE: Decimal = dec!(0.01);

/// Prompt helper; every read returns `None` on end of input
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    pub fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    pub fn symbol(&mut self, default: &str) -> io::Result<Option<String>> {
        loop {
            let Some(raw) = self.line(&format!("Enter trading pair (default: {}): ", default))? else {
                return Ok(None);
            };
            let raw = if raw.is_empty() { default } else { raw.as_str() };
            match normalize_symbol(raw) {
                Ok(symbol) => return Ok(Some(symbol)),
                Err(e) => self.say(&format!("Error: {}", e))?,
            }
        }
    }

    pub fn side(&mut self) -> io::Result<Option<OrderSide>> {
        loop {
            let Some(raw) = self.line("Enter order side (BUY/SELL): ")? else {
                return Ok(None);
            };
            match raw.parse::<OrderSide>() {
                Ok(side) => return Ok(Some(side)),
                Err(e) => self.say(&format!("Error: {}", e))?,
            }
        }
    }

    pub fn decimal(&mut self, prompt: &str, min: Decimal) -> io::Result<Option<Decimal>> {
        loop {
            let Some(raw) = self.line(prompt)? else {
                return Ok(None);
            };
            match Decimal::from_str(&raw) {
                Ok(value) if value < min => {
                    self.say(&format!("Value must be at least {}. Please try again.", min))?
                }
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say("Invalid input. Please enter a valid number.")?,
            }
        }
    }

    pub fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        loop {
            let Some(raw) = self.line(prompt)? else {
                return Ok(None);
            };
            match raw.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.say("Please enter 'y' or 'n'")?,
            }
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'s, 'l, E, R, W> {
    service: &'s mut TradingService<'l, E>,
    ui: UiSettings,
    default_symbol: String,
    prompter: Prompter<R, W>,
}

impl<'s, 'l, E, R, W> Menu<'s, 'l, E, R, W>
where
    E: FuturesExchange,
    R: BufRead,
    W: Write,
{
    pub fn new(
        service: &'s mut TradingService<'l, E>,
        ui: UiSettings,
        default_symbol: impl Into<String>,
        prompter: Prompter<R, W>,
    ) -> Self {
        Self {
            service,
            ui,
            default_symbol: default_symbol.into(),
            prompter,
        }
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.prompter.say("Welcome to the Binance Futures Trading Bot!")?;
        tracing::info!("CLI main loop started");

        loop {
            self.show_menu()?;
            let Some(choice) = self.prompter.line("\nSelect an option (1-5): ")? else {
                break;
            };
            tracing::debug!("User menu selection: {}", choice);

            let flow = match choice.as_str() {
                "1" => self.place(OrderKind::Market)?,
                "2" => self.place(OrderKind::Limit)?,
                "3" => self.place(OrderKind::StopLimit)?,
                "4" => {
                    self.show_account()?;
                    Flow::Continue
                }
                "5" => {
                    self.prompter
                        .say("Thank you for using the trading bot. Goodbye!")?;
                    Flow::Exit
                }
                _ => {
                    self.prompter.say("Invalid option. Please select 1-5.")?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                break;
            }
        }

        tracing::info!("CLI shutdown");
        Ok(())
    }

    fn show_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(50);
        self.prompter.say(&format!(
            "\n{rule}\nBINANCE FUTURES TRADING BOT\n{rule}\n\
             1. Place Market Order\n\
             2. Place Limit Order\n\
             3. Place Stop-Limit Order (Advanced)\n\
             4. View Account Info\n\
             5. Exit\n{rule}"
        ))
    }

    fn order_inputs(&mut self, kind: OrderKind) -> io::Result<Option<OrderRequest>> {
        self.prompter.say(&format!("\n--- {} ORDER ---", kind))?;

        let default_symbol = self.default_symbol.clone();
        let Some(symbol) = self.prompter.symbol(&default_symbol)? else {
            return Ok(None);
        };
        let Some(side) = self.prompter.side()? else {
            return Ok(None);
        };
        let min_quantity = self.service.bounds().min_quantity;
        let Some(quantity) = self.prompter.decimal("Enter quantity: ", min_quantity)? else {
            return Ok(None);
        };

        let request = match kind {
            OrderKind::Market => OrderRequest::market(symbol, side, quantity),
            OrderKind::Limit => {
                let Some(price) = self.prompter.decimal("Enter limit price: ", MIN_PRICE)? else {
                    return Ok(None);
                };
                OrderRequest::limit(symbol, side, quantity, price)
            }
            OrderKind::StopLimit => {
                let Some(price) = self.prompter.decimal("Enter limit price: ", MIN_PRICE)? else {
                    return Ok(None);
                };
                let Some(stop) = self.prompter.decimal("Enter stop price: ", MIN_PRICE)? else {
                    return Ok(None);
                };
                OrderRequest::stop_limit(symbol, side, quantity, price, stop)
            }
        };
        Ok(Some(request))
    }

    fn place(&mut self, kind: OrderKind) -> io::Result<Flow> {
        let Some(request) = self.order_inputs(kind)? else {
            return Ok(Flow::Exit);
        };

        if self.ui.show_confirmations {
            self.prompter.say(&format!("\n{}", request.confirmation()))?;
            match self.prompter.confirm("Confirm order? (y/n): ")? {
                None => return Ok(Flow::Exit),
                Some(false) => {
                    self.prompter.say("Order cancelled.")?;
                    tracing::info!("{} order cancelled by user", kind);
                    return Ok(Flow::Continue);
                }
                Some(true) => {}
            }
        }

        self.prompter
            .say(&format!("\nPlacing {} order...", kind.to_string().to_lowercase()))?;
        match self.service.place(&request) {
            Ok(receipt) => {
                self.prompter.say(&receipt.summary(self.ui.display_precision))?;
                if self.ui.auto_refresh_account {
                    self.show_account()?;
                }
            }
            Err(e) => self.prompter.say(&format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn show_account(&mut self) -> io::Result<()> {
        self.prompter.say("\nFetching account information...")?;
        match self.service.account_info() {
            Ok(info) => {
                let rule = "=".repeat(50);
                self.prompter.say(&format!(
                    "\n{rule}\nACCOUNT INFORMATION\n{rule}\n{}\n{rule}",
                    info.render(self.ui.display_precision)
                ))
            }
            Err(e) => self.prompter.say(&format!("Error: {}", e)),
        }
    }
}
