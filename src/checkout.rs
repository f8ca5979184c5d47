//! Checkout
//!
//! The payload handed to the payment collaborator. Amounts are integer minor units so the
//! payment side never re-derives or rounds anything.

use serde::Serialize;
use thiserror::Error;

use crate::cart::Cart;

/// Errors building a checkout request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to pay for.
    #[error("cannot check out an empty cart")]
    EmptyCart,
}

/// One line of the checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    /// Product identifier
    pub product_id: String,

    /// Catalog variant identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    /// Display name
    pub name: String,

    /// Size label
    pub size: String,

    /// Color label
    pub color: String,

    /// Units bought
    pub quantity: u32,

    /// Unit price in minor units
    pub unit_amount: i64,
}

/// Everything the payment collaborator needs to charge for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// ISO currency code
    pub currency: &'static str,

    /// Lines in cart order
    pub items: Vec<CheckoutLine>,

    /// Discount taken off the subtotal
    pub discount_amount: i64,

    /// Applied coupon code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,

    /// Shipping cost
    pub shipping_amount: i64,

    /// Selected carrier service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_service: Option<String>,

    /// Amount to charge
    pub total_amount: i64,
}

impl CheckoutRequest {
    /// Build the payload from a cart's current state and totals.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn from_cart(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = cart.totals();

        let items = cart
            .items()
            .map(|line| CheckoutLine {
                product_id: line.key().product().to_string(),
                variant_id: line.variant().map(str::to_string),
                name: line.name().to_string(),
                size: line.key().size().to_string(),
                color: line.key().color().to_string(),
                quantity: line.quantity(),
                unit_amount: line.price().to_minor_units(),
            })
            .collect();

        Ok(Self {
            currency: cart.currency().iso_alpha_code,
            items,
            discount_amount: totals.savings().to_minor_units(),
            coupon_code: cart.coupon().map(|coupon| coupon.code().to_string()),
            shipping_amount: totals.shipping().to_minor_units(),
            shipping_service: cart
                .shipping()
                .map(|shipping| shipping.quote().service_description.clone()),
            total_amount: totals.total().to_minor_units(),
        })
    }
}
