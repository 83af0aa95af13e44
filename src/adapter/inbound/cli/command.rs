//! Command-line interface definitions.
//!
//! Defines the CLI structure for the stockex application using `clap`.
//! Every catalog, listing and account operation has a subcommand; the
//! bearer token for protected operations comes from `--token` or
//! `STOCKEX_TOKEN`.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::page::{ExchangeSort, PageRequest, StockSort};
use crate::error::Result;

/// Stock exchange catalog CLI
#[derive(Parser, Debug)]
#[command(name = "stockex")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "STOCKEX_CONFIG",
        default_value = "stockex.toml"
    )]
    pub config: PathBuf,

    /// Access token, with or without the `Bearer ` prefix.
    #[arg(long, global = true, env = "STOCKEX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the stockex CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply pending migrations
    Migrate,

    /// Register, log in and inspect tokens
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Manage stocks
    #[command(subcommand)]
    Stock(StockCommand),

    /// Manage stock exchanges
    #[command(subcommand)]
    Exchange(ExchangeCommand),

    /// List and delist stocks on exchanges
    #[command(subcommand)]
    Listing(ListingCommand),
}

/// Subcommands for `stockex auth`.
#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Create an account. The first account is also an administrator.
    Register(RegisterArgs),
    /// Exchange email and password for an access and a refresh token.
    Login(LoginArgs),
    /// Exchange a refresh token for a new access token.
    Refresh(RefreshArgs),
    /// Show who the current token belongs to.
    Whoami,
}

/// Arguments for `stockex auth register`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    /// Password; prompted for when omitted.
    #[arg(long, env = "STOCKEX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for `stockex auth login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    /// Password; prompted for when omitted.
    #[arg(long, env = "STOCKEX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for `stockex auth refresh`.
#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Refresh token issued by `auth login`.
    pub refresh_token: String,
}

/// Subcommands for `stockex stock`.
#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// List stocks a page at a time.
    List(StockPageArgs),
    /// Show one stock.
    Get(IdArg),
    /// Create a stock.
    Create(StockCreateArgs),
    /// Change a stock's price.
    Price(StockPriceArgs),
    /// Delete a stock and every listing of it.
    Delete(IdArg),
    /// List the exchanges a stock is listed on.
    Exchanges {
        /// Stock id.
        id: i32,
        #[command(flatten)]
        page: ExchangePageArgs,
    },
}

/// Subcommands for `stockex exchange`.
#[derive(Subcommand, Debug)]
pub enum ExchangeCommand {
    /// List exchanges a page at a time.
    List {
        /// Only exchanges that are live in the market.
        #[arg(long)]
        live: bool,
        #[command(flatten)]
        page: ExchangePageArgs,
    },
    /// Show one exchange.
    Get(IdArg),
    /// Create an exchange. New exchanges are never live.
    Create(ExchangeCreateArgs),
    /// Rename or redescribe an exchange.
    Update(ExchangeUpdateArgs),
    /// Delete an exchange and its listings.
    Delete(IdArg),
    /// List the stocks listed on an exchange.
    Stocks {
        /// Exchange id.
        id: i32,
        #[command(flatten)]
        page: StockPageArgs,
    },
}

/// Subcommands for `stockex listing`.
#[derive(Subcommand, Debug)]
pub enum ListingCommand {
    /// List a stock on an exchange.
    Add(ListingArgs),
    /// Delist a stock from an exchange.
    Remove(ListingArgs),
    /// Re-derive an exchange's live flag from its listing count.
    Recompute {
        /// Exchange id.
        exchange: i32,
    },
}

/// A single entity id.
#[derive(Args, Debug)]
pub struct IdArg {
    pub id: i32,
}

/// Exchange and stock ids of a listing.
#[derive(Args, Debug)]
pub struct ListingArgs {
    /// Exchange id.
    pub exchange: i32,
    /// Stock id.
    pub stock: i32,
}

/// Arguments for `stockex stock create`.
#[derive(Args, Debug)]
pub struct StockCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: String,
    /// Current price, zero or greater.
    #[arg(long)]
    pub price: Decimal,
}

/// Arguments for `stockex stock price`.
#[derive(Args, Debug)]
pub struct StockPriceArgs {
    pub id: i32,
    /// New price, zero or greater.
    pub price: Decimal,
    /// Fail unless the stored stock is still at this version.
    #[arg(long)]
    pub expected_version: Option<i32>,
}

/// Arguments for `stockex exchange create`.
#[derive(Args, Debug)]
pub struct ExchangeCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: String,
}

/// Arguments for `stockex exchange update`.
#[derive(Args, Debug)]
pub struct ExchangeUpdateArgs {
    pub id: i32,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Must agree with the flag derived from the listing count.
    #[arg(long)]
    pub live_in_market: Option<bool>,
    /// Fail unless the stored exchange is still at this version.
    #[arg(long)]
    pub expected_version: Option<i32>,
}

/// Paging for stock lists.
#[derive(Args, Debug)]
pub struct StockPageArgs {
    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Rows per page.
    #[arg(long, default_value_t = 20)]
    pub size: u32,
    /// Sort key: id, name, price or updatedAt. Stocks on an exchange sort
    /// by name unless told otherwise, every other stock list by id.
    #[arg(long)]
    pub sort: Option<String>,
}

impl StockPageArgs {
    /// Validate into a page request, sorting by `default` when no key was
    /// given.
    ///
    /// # Errors
    /// Returns a validation error for a zero size or an unknown sort key.
    pub fn request(&self, default: StockSort) -> Result<PageRequest<StockSort>> {
        let sort = match &self.sort {
            Some(key) => key.parse()?,
            None => default,
        };
        Ok(PageRequest::new(self.page, self.size, sort)?)
    }
}

/// Paging for exchange lists.
#[derive(Args, Debug)]
pub struct ExchangePageArgs {
    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Rows per page.
    #[arg(long, default_value_t = 20)]
    pub size: u32,
    /// Sort key: id or name.
    #[arg(long, default_value = "id")]
    pub sort: String,
}

impl ExchangePageArgs {
    /// Validate into a page request.
    ///
    /// # Errors
    /// Returns a validation error for a zero size or an unknown sort key.
    pub fn request(&self) -> Result<PageRequest<ExchangeSort>> {
        let sort: ExchangeSort = self.sort.parse()?;
        Ok(PageRequest::new(self.page, self.size, sort)?)
    }
}
