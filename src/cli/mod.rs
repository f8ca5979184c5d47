use std::io;

use clap::{Args, Parser, Subcommand};
use tote::{
    items::LineKey,
    persistence::{FileStorage, PersistedStore},
    session::CartSession,
    summary::CartSummary,
};
use tracing::debug;

use crate::config::{LoggingConfig, StoreConfig};

mod add;
mod checkout;
mod clear;
mod coupon;
mod remove;
mod shipping;
mod show;
mod update;

#[derive(Debug, Parser)]
#[command(name = "tote", about = "Tote shopping cart", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the cart and its totals
    Show,
    /// Add an item
    Add(add::AddArgs),
    /// Remove a line
    Remove(remove::RemoveArgs),
    /// Change a line's quantity
    Update(update::UpdateArgs),
    /// Empty the cart
    Clear,
    /// Apply or remove a coupon
    Coupon(coupon::CouponCommand),
    /// Select or clear shipping
    Shipping(shipping::ShippingCommand),
    /// Print the payment hand-off payload as JSON
    Checkout,
}

pub(crate) type Session = CartSession<FileStorage>;

/// Identifies one line of the cart.
#[derive(Debug, Args)]
pub(crate) struct LineKeyArgs {
    /// Product identifier
    #[arg(long)]
    id: String,

    /// Size label
    #[arg(long)]
    size: String,

    /// Color label
    #[arg(long)]
    color: String,
}

impl LineKeyArgs {
    pub(crate) fn key(&self) -> LineKey {
        LineKey::new(self.id.as_str(), self.size.as_str(), self.color.as_str())
    }
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let mut session = self.store.open();

        let outcome = session.hydrate(self.store.hydration_timeout()).await;

        debug!(?outcome, brand = %self.store.brand, "session opened");

        match self.command {
            Commands::Show => show::run(&session),
            Commands::Add(args) => add::run(&mut session, args),
            Commands::Remove(args) => remove::run(&mut session, &args),
            Commands::Update(args) => update::run(&mut session, &args),
            Commands::Clear => clear::run(&mut session),
            Commands::Coupon(command) => coupon::run(&mut session, command),
            Commands::Shipping(command) => shipping::run(&mut session, command),
            Commands::Checkout => checkout::run(&session),
        }
    }
}

/// Print the cart summary, with the time left before the persisted copy expires.
pub(crate) fn print_summary(session: &Session) -> Result<(), String> {
    let mut summary = CartSummary::new(session.cart());

    if let Some(expires_in) = expires_in(session.store()) {
        summary = summary.with_expiry(expires_in);
    }

    summary
        .write_to(io::stdout().lock())
        .map_err(|error| error.to_string())
}

fn expires_in(store: &PersistedStore<FileStorage>) -> Option<jiff::SignedDuration> {
    store
        .try_read()
        .ok()
        .map(|envelope| store.expires_in(&envelope))
}
