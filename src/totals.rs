//! Totals

use rusty_money::{Money, iso::Currency};

use crate::{coupons::CouponAttachment, ledger::Ledger, shipping::ShippingAttachment};

/// Values derived from a cart's ledger and attachments. Never stored as a source of truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    item_count: u64,
    subtotal: i64,
    discount: i64,
    total_after_discount: i64,
    shipping: i64,
    total: i64,
    currency: &'static Currency,
}

impl Totals {
    /// Totals of an empty cart.
    #[must_use]
    pub fn zero(currency: &'static Currency) -> Self {
        Self {
            item_count: 0,
            subtotal: 0,
            discount: 0,
            total_after_discount: 0,
            shipping: 0,
            total: 0,
            currency,
        }
    }

    /// Sum of line quantities
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Sum of unit price times quantity
    pub fn subtotal(&self) -> Money<'static, Currency> {
        Money::from_minor(self.subtotal, self.currency)
    }

    /// Coupon discount as attached, or zero
    pub fn discount(&self) -> Money<'static, Currency> {
        Money::from_minor(self.discount, self.currency)
    }

    /// Subtotal less discount, never below zero
    pub fn total_after_discount(&self) -> Money<'static, Currency> {
        Money::from_minor(self.total_after_discount, self.currency)
    }

    /// Shipping cost, or zero
    pub fn shipping(&self) -> Money<'static, Currency> {
        Money::from_minor(self.shipping, self.currency)
    }

    /// Amount due: total after discount plus shipping
    pub fn total(&self) -> Money<'static, Currency> {
        Money::from_minor(self.total, self.currency)
    }

    /// Discount actually taken off the subtotal, which is less than the attached discount
    /// when that exceeds the subtotal.
    pub fn savings(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.subtotal.saturating_sub(self.total_after_discount),
            self.currency,
        )
    }

    /// Currency of every amount
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Derive totals from the ledger and the optional attachments.
///
/// Arithmetic is carried out in `i128` minor units and saturated back into `i64`, so the
/// function is total: no input makes it fail.
pub fn derive_totals(
    ledger: &Ledger,
    coupon: Option<&CouponAttachment>,
    shipping: Option<&ShippingAttachment>,
) -> Totals {
    let subtotal: i128 = ledger
        .iter()
        .map(|line| i128::from(line.price().to_minor_units()) * i128::from(line.quantity()))
        .sum();

    let discount = coupon.map_or(0, |coupon| i128::from(coupon.discount().to_minor_units()));
    let shipping = shipping.map_or(0, |shipping| i128::from(shipping.cost().to_minor_units()));

    let total_after_discount = (subtotal - discount).max(0);
    let total = total_after_discount + shipping;

    Totals {
        item_count: ledger.item_count(),
        subtotal: saturate(subtotal),
        discount: saturate(discount),
        total_after_discount: saturate(total_after_discount),
        shipping: saturate(shipping),
        total: saturate(total),
        currency: ledger.currency(),
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() { i64::MIN } else { i64::MAX })
}
