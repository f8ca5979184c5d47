use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Args, ValueEnum};
use tote::shipping::{ShippingQuote, cheapest, fastest};
use tracing::info;

use crate::cli::{Session, print_summary};

/// Which quote to take from a quotes file.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Pick {
    /// Lowest readable price
    Cheapest,

    /// Shortest delivery estimate
    Fastest,
}

#[derive(Debug, Args)]
pub(crate) struct SetShippingArgs {
    /// Carrier service name
    #[arg(long, required_unless_present = "quotes")]
    service: Option<String>,

    /// Quoted price, e.g. "20.00"
    #[arg(long, required_unless_present = "quotes")]
    price: Option<String>,

    /// Quoted delivery estimate, e.g. "5" or "5 dias úteis"
    #[arg(long, default_value = "")]
    delivery_time: String,

    /// JSON file with an array of carrier quotes to choose from
    #[arg(long, conflicts_with_all = ["service", "price"])]
    quotes: Option<PathBuf>,

    /// Quote to choose from the file
    #[arg(long, value_enum, default_value_t = Pick::Cheapest, requires = "quotes")]
    pick: Pick,
}

pub(crate) fn run(session: &mut Session, args: SetShippingArgs) -> Result<(), String> {
    let quote = match args.quotes {
        Some(path) => pick_from_file(&path, args.pick)?,
        None => ShippingQuote::new(
            args.service.unwrap_or_default(),
            args.price.unwrap_or_default(),
            args.delivery_time,
        ),
    };

    info!(service = %quote.service_description, price = %quote.shipping_price, "shipping selected");

    session.set_shipping(Some(quote));

    print_summary(session)
}

fn pick_from_file(path: &Path, pick: Pick) -> Result<ShippingQuote, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;

    let quotes: Vec<ShippingQuote> = serde_json::from_str(&raw)
        .map_err(|error| format!("invalid quotes in {}: {error}", path.display()))?;

    let chosen = match pick {
        Pick::Cheapest => cheapest(&quotes),
        Pick::Fastest => fastest(&quotes),
    };

    chosen
        .cloned()
        .ok_or_else(|| format!("no usable quote in {}", path.display()))
}
