//! Coupons
//!
//! A cart carries at most one [`CouponAttachment`]: a code and a discount amount that was
//! already resolved against the subtotal when the coupon was applied. The cart only stores
//! and subtracts that amount.
//!
//! [`CouponRule`] and [`CouponBook`] model the validation side (percentage or fixed
//! discounts, minimum purchase, expiry) that produces those amounts.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::money::{AmountError, percent_of_minor};

/// Errors building a coupon attachment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// The coupon code is blank.
    #[error("coupon code is empty")]
    EmptyCode,

    /// The discount is below zero (minor units).
    #[error("coupon discount cannot be negative: {0}")]
    NegativeDiscount(i64),

    /// The discount currency differs from the cart currency (discount currency, cart currency).
    #[error("coupon discount has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// A coupon applied to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponAttachment {
    code: String,
    discount: Money<'static, Currency>,
}

impl CouponAttachment {
    /// Create an attachment with a pre-resolved discount.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the code is blank or the discount is negative.
    pub fn new(
        code: impl Into<String>,
        discount: Money<'static, Currency>,
    ) -> Result<Self, CouponError> {
        let code = code.into().trim().to_string();

        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        let minor = discount.to_minor_units();

        if minor < 0 {
            return Err(CouponError::NegativeDiscount(minor));
        }

        Ok(Self { code, discount })
    }

    /// The coupon code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The discount amount
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    pub(crate) fn ensure_currency(&self, currency: &'static Currency) -> Result<(), CouponError> {
        let discount_currency = self.discount.currency();

        if discount_currency == currency {
            Ok(())
        } else {
            Err(CouponError::CurrencyMismatch(
                discount_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ))
        }
    }
}

/// How a coupon discounts the subtotal.
#[derive(Debug, Clone, Copy)]
pub enum CouponKind {
    /// Percentage of the subtotal.
    Percentage(Percentage),

    /// Fixed amount off, capped at the subtotal.
    Fixed(Money<'static, Currency>),
}

/// A coupon definition as managed by a brand.
#[derive(Debug, Clone)]
pub struct CouponRule {
    /// Code customers type in
    pub code: String,

    /// Discount applied when valid
    pub kind: CouponKind,

    /// Minimum subtotal required
    pub min_purchase: Option<Money<'static, Currency>>,

    /// Moment after which the coupon stops working
    pub expires_at: Option<Timestamp>,

    /// Whether the coupon is currently enabled
    pub active: bool,
}

/// Outcome of validating a code against a subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponValidation {
    /// Code that was checked
    pub code: String,

    /// Whether the coupon can be applied
    pub valid: bool,

    /// Discount resolved against the subtotal; zero when invalid
    pub discount: Money<'static, Currency>,

    /// Message suitable for showing to the customer
    pub message: String,
}

impl CouponValidation {
    fn rejected(code: &str, currency: &'static Currency, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            valid: false,
            discount: Money::from_minor(0, currency),
            message: message.into(),
        }
    }

    /// Turn a valid result into an attachment; invalid results yield `None`.
    pub fn into_attachment(self) -> Option<CouponAttachment> {
        if !self.valid {
            return None;
        }

        CouponAttachment::new(self.code, self.discount).ok()
    }
}

impl CouponRule {
    /// Check whether `code` matches this rule and resolve its discount against `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if a percentage discount cannot be represented.
    pub fn validate(
        &self,
        code: &str,
        subtotal: Money<'static, Currency>,
        now: Timestamp,
    ) -> Result<CouponValidation, AmountError> {
        let currency = subtotal.currency();

        if !self.code.eq_ignore_ascii_case(code.trim()) {
            return Ok(CouponValidation::rejected(code, currency, "coupon not found"));
        }

        if !self.active {
            return Ok(CouponValidation::rejected(code, currency, "coupon is inactive"));
        }

        if self.expires_at.is_some_and(|expires_at| now >= expires_at) {
            return Ok(CouponValidation::rejected(code, currency, "coupon has expired"));
        }

        let subtotal_minor = subtotal.to_minor_units();

        if let Some(min_purchase) = self
            .min_purchase
            .filter(|min| subtotal_minor < min.to_minor_units())
        {
            return Ok(CouponValidation::rejected(
                code,
                currency,
                format!("minimum purchase of {min_purchase} not reached"),
            ));
        }

        let discount_minor = match self.kind {
            CouponKind::Percentage(percent) => percent_of_minor(&percent, subtotal_minor)?,
            CouponKind::Fixed(amount) => amount.to_minor_units(),
        };

        Ok(CouponValidation {
            code: self.code.clone(),
            valid: true,
            discount: Money::from_minor(discount_minor.clamp(0, subtotal_minor.max(0)), currency),
            message: "coupon applied".to_string(),
        })
    }
}

/// A brand's coupon rules, keyed by upper-cased code.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    rules: FxHashMap<String, CouponRule>,
}

impl CouponBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, rule: CouponRule) {
        self.rules.insert(rule.code.trim().to_ascii_uppercase(), rule);
    }

    /// Validate a code against the subtotal at `now`.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if a percentage discount cannot be represented.
    pub fn validate(
        &self,
        code: &str,
        subtotal: Money<'static, Currency>,
        now: Timestamp,
    ) -> Result<CouponValidation, AmountError> {
        match self.rules.get(&code.trim().to_ascii_uppercase()) {
            Some(rule) => rule.validate(code, subtotal, now),
            None => Ok(CouponValidation::rejected(
                code,
                subtotal.currency(),
                "coupon not found",
            )),
        }
    }
}
