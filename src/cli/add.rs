use clap::Args;
use rusty_money::Money;
use tote::{
    items::NewLineItem,
    money::{parse_amount, to_minor},
};

use super::{LineKeyArgs, Session, print_summary};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    line: LineKeyArgs,

    /// Display name
    #[arg(long)]
    name: String,

    /// Unit price in major units, e.g. "100" or "99,90"
    #[arg(long)]
    price: String,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Units in stock; adds beyond this are rejected
    #[arg(long)]
    stock: Option<u32>,

    /// Catalog variant identifier
    #[arg(long)]
    variant: Option<String>,

    /// Image reference, repeatable
    #[arg(long = "image")]
    images: Vec<String>,
}

pub(crate) fn run(session: &mut Session, args: AddArgs) -> Result<(), String> {
    let currency = session.cart().currency();

    let price = parse_amount(&args.price)
        .filter(|price| !price.is_sign_negative())
        .ok_or_else(|| format!("invalid price: {}", args.price))?;

    let minor = to_minor(price, currency).map_err(|error| error.to_string())?;

    let mut item = NewLineItem::new(args.line.key(), args.name, Money::from_minor(minor, currency))
        .with_images(args.images);

    if let Some(variant) = args.variant {
        item = item.with_variant(variant);
    }

    if let Some(stock) = args.stock {
        item = item.with_stock(stock);
    }

    session
        .add(item, args.quantity)
        .map_err(|error| format!("item not added: {error}"))?;

    print_summary(session)
}
