//! Tote prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    brands::{BrandError, BrandId},
    cart::Cart,
    checkout::{CheckoutError, CheckoutLine, CheckoutRequest},
    coupons::{CouponAttachment, CouponBook, CouponError, CouponKind, CouponRule, CouponValidation},
    items::{LineItem, LineKey, NewLineItem, ProductId},
    ledger::{Ledger, LedgerError},
    money::{AmountError, currency_from_code, from_minor, parse_amount, to_minor},
    observer::{CartObserver, NoopObserver},
    persistence::{
        Clock, DEFAULT_TTL, Envelope, EnvelopeError, FileStorage, MemoryStorage,
        PersistedStateError, PersistedStore, Storage, StorageError, SystemClock,
    },
    session::{CartSession, DEFAULT_HYDRATION_TIMEOUT, HydrationOutcome, Lifecycle},
    shipping::{ShippingAttachment, ShippingQuote, cheapest, fastest},
    summary::{CartSummary, SummaryError},
    totals::{Totals, derive_totals},
};
