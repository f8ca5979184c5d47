//! Persisted cart layout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{coupons::CouponError, money::AmountError, shipping::ShippingQuote};

/// Errors turning an envelope into a cart, or a cart into an envelope.
#[derive(Debug, Error, PartialEq)]
pub enum EnvelopeError {
    /// An amount could not be converted between decimal and minor units.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// A stored line has a negative price (line key).
    #[error("stored line {0} has a negative price")]
    NegativePrice(String),

    /// The stored coupon is unusable.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Everything persisted for one cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Line items in ledger order
    pub cart: Vec<StoredLine>,

    /// Applied coupon, if any
    #[serde(default)]
    pub coupon: Option<StoredCoupon>,

    /// Selected shipping quote, if any
    #[serde(default)]
    pub shipping: Option<ShippingQuote>,

    /// Epoch milliseconds of the last write
    #[serde(rename = "_timestamp")]
    pub timestamp: i64,
}

/// A persisted line item. Prices are major-unit JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLine {
    /// Product identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price captured at add time
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Image references
    #[serde(default)]
    pub images: Vec<String>,

    /// Size label
    pub selected_size: String,

    /// Color label
    pub selected_color: String,

    /// Quantity in the cart
    pub quantity: u32,

    /// Catalog variant identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    /// Stock ceiling known at add time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// A persisted coupon attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCoupon {
    /// Coupon code
    pub code: String,

    /// Resolved discount in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    const STORED: &str = r#"{
        "cart": [
            {
                "id": "A",
                "name": "Shirt",
                "price": 100,
                "images": ["a.jpg"],
                "selectedSize": "M",
                "selectedColor": "red",
                "quantity": 2,
                "stock": 5
            }
        ],
        "coupon": { "code": "SAVE50", "discount": 50.5 },
        "shipping": { "ServiceDescription": "SEDEX", "ShippingPrice": "20.00", "DeliveryTime": "3" },
        "_timestamp": 1700000000000
    }"#;

    #[test]
    fn parses_stored_layout() -> TestResult {
        let envelope: Envelope = serde_json::from_str(STORED)?;

        let line = envelope.cart.first().ok_or("missing line")?;

        assert_eq!(line.price, dec!(100));
        assert_eq!(line.selected_size, "M");
        assert_eq!(line.stock, Some(5));
        assert_eq!(line.variant_id, None);
        assert_eq!(
            envelope.coupon.as_ref().map(|coupon| coupon.discount),
            Some(dec!(50.5))
        );
        assert_eq!(
            envelope
                .shipping
                .as_ref()
                .map(|shipping| shipping.shipping_price.as_str()),
            Some("20.00")
        );
        assert_eq!(envelope.timestamp, 1_700_000_000_000);

        Ok(())
    }

    #[test]
    fn missing_attachments_default_to_none() -> TestResult {
        let envelope: Envelope = serde_json::from_str(r#"{ "cart": [], "_timestamp": 1 }"#)?;

        assert!(envelope.coupon.is_none());
        assert!(envelope.shipping.is_none());

        Ok(())
    }

    #[test]
    fn missing_timestamp_is_malformed() {
        let result = serde_json::from_str::<Envelope>(r#"{ "cart": [] }"#);

        assert!(result.is_err());
    }

    #[test]
    fn serialises_camel_case_fields() -> TestResult {
        let envelope: Envelope = serde_json::from_str(STORED)?;

        let json = serde_json::to_value(&envelope)?;

        assert_eq!(json["cart"][0]["selectedColor"], "red");
        assert_eq!(json["_timestamp"], 1_700_000_000_000_i64);
        assert!(json["cart"][0].get("variantId").is_none());

        Ok(())
    }
}
