//! Shipping

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::money::{parse_amount, to_minor};

/// A carrier quote, passed through with the quoting service's own field names.
///
/// Fields the cart does not interpret are kept in `extra` so they survive persistence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShippingQuote {
    /// Carrier service name, e.g. "SEDEX"
    #[serde(default)]
    pub service_description: String,

    /// Price as quoted, e.g. "20.00"
    #[serde(default, deserialize_with = "price_text")]
    pub shipping_price: String,

    /// Delivery estimate as quoted, e.g. "5" or "5 dias úteis"
    #[serde(default, deserialize_with = "price_text")]
    pub delivery_time: String,

    /// Any other quote fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept strings or bare numbers; quoting services are not consistent about which they send.
fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

impl ShippingQuote {
    /// Create a quote from its three meaningful fields.
    pub fn new(
        service: impl Into<String>,
        price: impl Into<String>,
        delivery_time: impl Into<String>,
    ) -> Self {
        Self {
            service_description: service.into(),
            shipping_price: price.into(),
            delivery_time: delivery_time.into(),
            extra: Map::new(),
        }
    }

    /// The quoted price, if it parses and is not negative.
    pub fn price(&self) -> Option<Decimal> {
        parse_amount(&self.shipping_price).filter(|price| !price.is_sign_negative())
    }

    /// Leading number of days in the delivery estimate.
    pub fn delivery_days(&self) -> Option<u32> {
        let digits: String = self
            .delivery_time
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();

        digits.parse().ok()
    }
}

/// The cheapest quote with a readable price.
pub fn cheapest(quotes: &[ShippingQuote]) -> Option<&ShippingQuote> {
    quotes
        .iter()
        .filter_map(|quote| quote.price().map(|price| (price, quote)))
        .min_by_key(|(price, _)| *price)
        .map(|(_, quote)| quote)
}

/// The quote with the shortest delivery estimate, preferring the cheaper one on ties.
pub fn fastest(quotes: &[ShippingQuote]) -> Option<&ShippingQuote> {
    quotes
        .iter()
        .filter_map(|quote| quote.delivery_days().map(|days| (days, quote)))
        .min_by_key(|(days, quote)| (*days, quote.price().unwrap_or(Decimal::MAX)))
        .map(|(_, quote)| quote)
}

/// The selected shipping quote and the cost derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingAttachment {
    quote: ShippingQuote,
    cost: Money<'static, Currency>,
}

impl ShippingAttachment {
    /// Derive the cost from the quote price; an unreadable price costs nothing.
    pub fn from_quote(quote: ShippingQuote, currency: &'static Currency) -> Self {
        let minor = quote
            .price()
            .and_then(|price| to_minor(price, currency).ok())
            .unwrap_or_else(|| {
                debug!(
                    service = %quote.service_description,
                    price = %quote.shipping_price,
                    "unreadable shipping price, treating as free"
                );

                0
            });

        Self {
            quote,
            cost: Money::from_minor(minor, currency),
        }
    }

    /// The selected quote
    pub fn quote(&self) -> &ShippingQuote {
        &self.quote
    }

    /// The derived shipping cost
    pub fn cost(&self) -> Money<'static, Currency> {
        self.cost
    }
}
