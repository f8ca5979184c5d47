//! Cart
//!
//! The owned state container: a [`Ledger`], at most one coupon and at most one shipping
//! selection, plus the [`Totals`] derived from them. Every mutation re-derives the totals
//! before returning, so they are never stale.

use rusty_money::{Money, iso::Currency};

use crate::{
    coupons::{CouponAttachment, CouponError},
    items::{LineItem, LineKey, NewLineItem},
    ledger::{Ledger, LedgerError},
    money::{from_minor, to_minor},
    persistence::envelope::{Envelope, EnvelopeError, StoredCoupon, StoredLine},
    shipping::{ShippingAttachment, ShippingQuote},
    totals::{Totals, derive_totals},
};

/// A shopping cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    ledger: Ledger,
    coupon: Option<CouponAttachment>,
    shipping: Option<ShippingAttachment>,
    totals: Totals,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            ledger: Ledger::new(currency),
            coupon: None,
            shipping: None,
            totals: Totals::zero(currency),
        }
    }

    /// Add `quantity` units of an item. See [`Ledger::add`].
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the ledger rejects the item; the cart is unchanged.
    pub fn add(&mut self, item: NewLineItem, quantity: u32) -> Result<(), LedgerError> {
        self.ledger.add(item, quantity)?;
        self.rederive();

        Ok(())
    }

    /// Remove a line, returning it if it was present.
    pub fn remove(&mut self, key: &LineKey) -> Option<LineItem> {
        let removed = self.ledger.remove(key);

        self.rederive();

        removed
    }

    /// Change a line's quantity by `delta`, returning whether it changed. See
    /// [`Ledger::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the ledger rejects the change; the cart is unchanged.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> Result<bool, LedgerError> {
        let changed = self.ledger.update_quantity(key, delta)?;

        if changed {
            self.rederive();
        }

        Ok(changed)
    }

    /// Empty the cart, dropping the coupon and the shipping selection too.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.coupon = None;
        self.shipping = None;
        self.rederive();
    }

    /// Attach a coupon with an already resolved discount, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the code is blank, the discount is negative, or it is in
    /// another currency. The previous coupon stays attached in that case.
    pub fn apply_coupon(
        &mut self,
        code: impl Into<String>,
        discount: Money<'static, Currency>,
    ) -> Result<(), CouponError> {
        let coupon = CouponAttachment::new(code, discount)?;

        coupon.ensure_currency(self.currency())?;

        self.coupon = Some(coupon);
        self.rederive();

        Ok(())
    }

    /// Detach the coupon, returning it.
    pub fn remove_coupon(&mut self) -> Option<CouponAttachment> {
        let removed = self.coupon.take();

        self.rederive();

        removed
    }

    /// Select a shipping quote, or clear the selection with `None`.
    pub fn set_shipping(&mut self, quote: Option<ShippingQuote>) {
        let currency = self.currency();

        self.shipping = quote.map(|quote| ShippingAttachment::from_quote(quote, currency));
        self.rederive();
    }

    /// Clear the shipping selection, returning it.
    pub fn remove_shipping(&mut self) -> Option<ShippingAttachment> {
        let removed = self.shipping.take();

        self.rederive();

        removed
    }

    /// Current totals
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Line items in insertion order
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.ledger.iter()
    }

    /// The underlying ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Attached coupon, if any
    pub fn coupon(&self) -> Option<&CouponAttachment> {
        self.coupon.as_ref()
    }

    /// Selected shipping, if any
    pub fn shipping(&self) -> Option<&ShippingAttachment> {
        self.shipping.as_ref()
    }

    /// Currency of every amount in the cart
    pub fn currency(&self) -> &'static Currency {
        self.ledger.currency()
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Serialisable form of the cart. The timestamp is left at zero for the store to stamp.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] if an amount cannot be expressed in major units.
    pub fn to_envelope(&self) -> Result<Envelope, EnvelopeError> {
        let currency = self.currency();

        let cart = self
            .ledger
            .iter()
            .map(|line| {
                Ok(StoredLine {
                    id: line.key().product().to_string(),
                    name: line.name().to_string(),
                    price: from_minor(line.price().to_minor_units(), currency)?,
                    images: line.images().to_vec(),
                    selected_size: line.key().size().to_string(),
                    selected_color: line.key().color().to_string(),
                    quantity: line.quantity(),
                    variant_id: line.variant().map(str::to_string),
                    stock: line.stock(),
                })
            })
            .collect::<Result<Vec<_>, EnvelopeError>>()?;

        let coupon = self
            .coupon
            .as_ref()
            .map(|coupon| {
                Ok::<_, EnvelopeError>(StoredCoupon {
                    code: coupon.code().to_string(),
                    discount: from_minor(coupon.discount().to_minor_units(), currency)?,
                })
            })
            .transpose()?;

        Ok(Envelope {
            cart,
            coupon,
            shipping: self.shipping.as_ref().map(|shipping| shipping.quote().clone()),
            timestamp: 0,
        })
    }

    /// Rebuild a cart from its serialised form, deriving totals once at the end.
    ///
    /// Stored lines are repaired where possible: quantities are clamped to `[1, stock]`,
    /// lines with zero stock are dropped and duplicate keys are merged.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] if a price is negative or unrepresentable, or the stored
    /// coupon is unusable.
    pub fn from_envelope(
        envelope: Envelope,
        currency: &'static Currency,
    ) -> Result<Self, EnvelopeError> {
        let mut ledger = Ledger::new(currency);

        for stored in envelope.cart {
            let key = LineKey::new(stored.id, stored.selected_size, stored.selected_color);

            if stored.price.is_sign_negative() && !stored.price.is_zero() {
                return Err(EnvelopeError::NegativePrice(key.to_string()));
            }

            let price = Money::from_minor(to_minor(stored.price, currency)?, currency);

            let mut item = NewLineItem::new(key, stored.name, price).with_images(stored.images);

            if let Some(variant) = stored.variant_id {
                item = item.with_variant(variant);
            }

            if let Some(stock) = stored.stock {
                item = item.with_stock(stock);
            }

            ledger.restore(item.into_line(stored.quantity));
        }

        let coupon = envelope
            .coupon
            .map(|stored| {
                let discount = Money::from_minor(to_minor(stored.discount, currency)?, currency);

                Ok::<_, EnvelopeError>(CouponAttachment::new(stored.code, discount)?)
            })
            .transpose()?;

        let shipping = envelope
            .shipping
            .map(|quote| ShippingAttachment::from_quote(quote, currency));

        let totals = derive_totals(&ledger, coupon.as_ref(), shipping.as_ref());

        Ok(Self {
            ledger,
            coupon,
            shipping,
            totals,
        })
    }

    fn rederive(&mut self) {
        self.totals = derive_totals(&self.ledger, self.coupon.as_ref(), self.shipping.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use super::*;

    fn brl(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, BRL)
    }

    fn shirt(stock: u32) -> NewLineItem {
        NewLineItem::new(LineKey::new("A", "M", "red"), "Shirt", brl(100_00))
            .with_images(["a.jpg"])
            .with_stock(stock)
    }

    #[test]
    fn totals_follow_every_mutation() -> TestResult {
        let mut cart = Cart::new(BRL);
        let key = LineKey::new("A", "M", "red");

        cart.add(shirt(5), 2)?;
        assert_eq!(cart.totals().subtotal(), brl(200_00));

        cart.apply_coupon("SAVE50", brl(50_00))?;
        assert_eq!(cart.totals().total(), brl(150_00));

        cart.set_shipping(Some(ShippingQuote::new("SEDEX", "20.00", "3")));
        assert_eq!(cart.totals().total(), brl(170_00));

        cart.update_quantity(&key, 1)?;
        assert_eq!(cart.totals().total(), brl(270_00));

        cart.remove_coupon();
        assert_eq!(cart.totals().total(), brl(320_00));

        cart.remove_shipping();
        assert_eq!(cart.totals().total(), brl(300_00));

        cart.remove(&key);
        assert_eq!(cart.totals(), Totals::zero(BRL));

        Ok(())
    }

    #[test]
    fn rejected_mutations_leave_cart_untouched() -> TestResult {
        let mut cart = Cart::new(BRL);

        cart.add(shirt(2), 2)?;

        let before = cart.clone();

        assert!(cart.add(shirt(2), 1).is_err());
        assert!(cart.apply_coupon("X", Money::from_minor(10, USD)).is_err());
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn clear_drops_attachments() -> TestResult {
        let mut cart = Cart::new(BRL);

        cart.add(shirt(5), 1)?;
        cart.apply_coupon("SAVE10", brl(10_00))?;
        cart.set_shipping(Some(ShippingQuote::new("PAC", "12.00", "8")));
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.coupon().is_none());
        assert!(cart.shipping().is_none());
        assert_eq!(cart.totals(), Totals::zero(BRL));

        Ok(())
    }

    #[test]
    fn envelope_round_trip_preserves_state() -> TestResult {
        let mut cart = Cart::new(BRL);

        cart.add(shirt(5).with_variant("A-M-RED"), 2)?;
        cart.apply_coupon("SAVE50", brl(50_50))?;
        cart.set_shipping(Some(ShippingQuote::new("SEDEX", "20.00", "3")));

        let envelope = cart.to_envelope()?;

        assert_eq!(envelope.cart.first().map(|line| line.price), Some(dec!(100)));
        assert_eq!(
            envelope.coupon.as_ref().map(|coupon| coupon.discount),
            Some(dec!(50.5))
        );

        let restored = Cart::from_envelope(envelope, BRL)?;

        assert_eq!(restored, cart);

        Ok(())
    }

    #[test]
    fn restore_repairs_stored_lines() -> TestResult {
        let line = |quantity, stock| StoredLine {
            id: "A".to_string(),
            name: "Shirt".to_string(),
            price: dec!(10),
            images: Vec::new(),
            selected_size: "M".to_string(),
            selected_color: "red".to_string(),
            quantity,
            variant_id: None,
            stock,
        };

        let envelope = Envelope {
            cart: vec![line(0, None), line(9, Some(4)), {
                let mut sold_out = line(1, Some(0));
                sold_out.id = "B".to_string();
                sold_out
            }],
            ..Envelope::default()
        };

        let cart = Cart::from_envelope(envelope, BRL)?;

        assert_eq!(cart.ledger().len(), 1);
        assert_eq!(cart.items().next().map(LineItem::quantity), Some(4));
        assert_eq!(cart.totals().subtotal(), brl(40_00));

        Ok(())
    }

    #[test]
    fn negative_stored_price_is_rejected() {
        let envelope = Envelope {
            cart: vec![StoredLine {
                id: "A".to_string(),
                name: String::new(),
                price: dec!(-1),
                images: Vec::new(),
                selected_size: "M".to_string(),
                selected_color: "red".to_string(),
                quantity: 1,
                variant_id: None,
                stock: None,
            }],
            ..Envelope::default()
        };

        assert_eq!(
            Cart::from_envelope(envelope, BRL),
            Err(EnvelopeError::NegativePrice("A/M/red".to_string()))
        );
    }
}
