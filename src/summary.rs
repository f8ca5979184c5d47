//! Summary
//!
//! Terminal rendering of a cart: one table row per line, followed by the totals.

use std::{io, time::Duration};

use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::SignedDuration;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::cart::Cart;

/// Errors rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Writing to the output failed.
    #[error("failed to write cart summary")]
    IO,
}

/// A printable view of a cart.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'a> {
    cart: &'a Cart,
    expires_in: Option<SignedDuration>,
}

impl<'a> CartSummary<'a> {
    /// Summarise `cart`.
    pub fn new(cart: &'a Cart) -> Self {
        Self {
            cart,
            expires_in: None,
        }
    }

    /// Also show how long the persisted cart has left.
    #[must_use]
    pub fn with_expiry(mut self, expires_in: SignedDuration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Write the summary.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::IO`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.cart.is_empty() {
            writeln!(out, "Cart is empty").map_err(|_err| SummaryError::IO)?;
        } else {
            self.write_lines(&mut out)?;
        }

        self.write_totals(&mut out)
    }

    fn write_lines(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Size", "Color", "Qty", "Unit", "Total"]);

        for line in self.cart.items() {
            builder.push_record([
                format!("{} ({})", line.name(), line.key().product()),
                line.key().size().to_string(),
                line.key().color().to_string(),
                line.quantity().to_string(),
                line.price().to_string(),
                line.line_total().to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let totals = self.cart.totals();

        let mut rows = vec![
            ("Items:", totals.item_count().to_string()),
            ("Subtotal:", totals.subtotal().to_string()),
        ];

        if let Some(coupon) = self.cart.coupon() {
            rows.push(("Coupon:", coupon.code().to_string()));
            rows.push(("Discount:", format!("-{}", totals.savings())));
        }

        if let Some(shipping) = self.cart.shipping() {
            rows.push((
                "Shipping:",
                format!(
                    "{} ({})",
                    totals.shipping(),
                    shipping.quote().service_description
                ),
            ));
        }

        rows.push(("Total:", totals.total().to_string()));

        if let Some(expires_in) = self.expires_in {
            let whole_minutes = Duration::from_secs(expires_in.unsigned_abs().as_secs() / 60 * 60);

            rows.push(("Expires in:", whole_minutes.human(Truncate::Nano).to_string()));
        }

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:<label_width$} {value}").map_err(|_err| SummaryError::IO)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::{
        items::{LineKey, NewLineItem},
        shipping::ShippingQuote,
    };

    use super::*;

    fn render(summary: CartSummary<'_>) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        summary.write_to(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn renders_lines_and_totals() -> TestResult {
        let mut cart = Cart::new(BRL);

        cart.add(
            NewLineItem::new(
                LineKey::new("A", "M", "red"),
                "Shirt",
                Money::from_minor(100_00, BRL),
            ),
            2,
        )?;
        cart.apply_coupon("SAVE50", Money::from_minor(50_00, BRL))?;
        cart.set_shipping(Some(ShippingQuote::new("SEDEX", "20.00", "3")));

        let output = render(CartSummary::new(&cart).with_expiry(SignedDuration::from_hours(6)))?;

        assert!(output.contains("Shirt (A)"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("SAVE50"));
        assert!(output.contains("SEDEX"));
        assert!(output.contains("Total:"));
        assert!(output.contains("Expires in:"));

        Ok(())
    }

    #[test]
    fn renders_empty_cart() -> TestResult {
        let cart = Cart::new(BRL);

        let output = render(CartSummary::new(&cart))?;

        assert!(output.contains("Cart is empty"));
        assert!(!output.contains("Expires in:"));

        Ok(())
    }
}
