//! Sessions
//!
//! A [`CartSession`] owns one [`Cart`] and keeps it in step with a [`PersistedStore`]. It
//! starts out [`Lifecycle::Hydrating`] and becomes [`Lifecycle::Ready`] once, either when
//! [`CartSession::hydrate`] finishes or when the first mutation arrives without waiting for
//! it.

use std::{fmt, sync::Arc, time::Duration};

use rusty_money::{Money, iso::Currency};
use tracing::{debug, info, warn};

use crate::{
    cart::Cart,
    coupons::{CouponAttachment, CouponError},
    items::{LineItem, LineKey, NewLineItem},
    ledger::LedgerError,
    observer::CartObserver,
    persistence::{Clock, Envelope, PersistedStateError, PersistedStore, Storage, SystemClock},
    shipping::{ShippingAttachment, ShippingQuote},
    totals::Totals,
};

/// How long [`CartSession::hydrate`] waits for storage by default.
pub const DEFAULT_HYDRATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The persisted cart has not been loaded yet.
    Hydrating,

    /// The cart is in use. Terminal.
    Ready,
}

/// What hydration found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A stored cart was loaded.
    Restored {
        /// Number of distinct lines restored
        lines: usize,
    },

    /// Nothing usable was stored, or storage could not be read.
    Empty,

    /// The stored cart outlived its time to live and was purged.
    Expired,

    /// The stored cart was malformed and ignored.
    Discarded,

    /// Storage did not answer in time; the session continued with an empty cart.
    TimedOut,

    /// The session was already ready, so nothing was loaded.
    AlreadyReady,
}

/// A cart wired to persistence and observers.
pub struct CartSession<S, C = SystemClock> {
    cart: Cart,
    store: Arc<PersistedStore<S, C>>,
    lifecycle: Lifecycle,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S, C> fmt::Debug for CartSession<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSession")
            .field("cart", &self.cart)
            .field("lifecycle", &self.lifecycle)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S, C> CartSession<S, C>
where
    S: Storage + 'static,
    C: Clock + 'static,
{
    /// Create a hydrating session with an empty cart.
    pub fn new(store: PersistedStore<S, C>, currency: &'static Currency) -> Self {
        Self::with_shared_store(Arc::new(store), currency)
    }

    /// Create a hydrating session over a store shared with other code.
    pub fn with_shared_store(
        store: Arc<PersistedStore<S, C>>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            cart: Cart::new(currency),
            store,
            lifecycle: Lifecycle::Hydrating,
            observers: Vec::new(),
        }
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether hydration has finished or been skipped
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// The cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current totals
    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    /// The backing store
    pub fn store(&self) -> &PersistedStore<S, C> {
        &self.store
    }

    /// Load the persisted cart, giving up after `timeout`.
    ///
    /// Storage is read on the blocking pool. Whatever happens, the session is ready
    /// afterwards; a read that finishes after the timeout is discarded. The background read
    /// never writes, so an expired entry is only purged when its result is used.
    pub async fn hydrate(&mut self, timeout: Duration) -> HydrationOutcome {
        if self.is_ready() {
            return HydrationOutcome::AlreadyReady;
        }

        let store = Arc::clone(&self.store);
        let read = tokio::task::spawn_blocking(move || store.inspect());

        let outcome = match tokio::time::timeout(timeout, read).await {
            Ok(Ok(result)) => self.restore(result),
            Ok(Err(error)) => {
                warn!(%error, "hydration task failed, continuing with an empty cart");

                HydrationOutcome::Empty
            }
            Err(_elapsed) => {
                warn!(
                    timeout_ms = timeout.as_millis(),
                    "hydration timed out, continuing with an empty cart"
                );

                HydrationOutcome::TimedOut
            }
        };

        info!(?outcome, lines = self.cart.ledger().len(), "cart hydrated");

        self.mark_ready();

        outcome
    }

    fn restore(&mut self, result: Result<Envelope, PersistedStateError>) -> HydrationOutcome {
        match result {
            Ok(envelope) => match Cart::from_envelope(envelope, self.cart.currency()) {
                Ok(cart) => {
                    self.cart = cart;

                    HydrationOutcome::Restored {
                        lines: self.cart.ledger().len(),
                    }
                }
                Err(error) => {
                    warn!(%error, "discarding persisted cart");

                    HydrationOutcome::Discarded
                }
            },
            Err(PersistedStateError::Absent) => HydrationOutcome::Empty,
            Err(PersistedStateError::Expired { age }) => {
                debug!(age = %format!("{age:#}"), "purging expired cart");

                self.store.clear();

                HydrationOutcome::Expired
            }
            Err(error @ PersistedStateError::Storage(_)) => {
                warn!(%error, "persisted cart unavailable");

                HydrationOutcome::Empty
            }
            Err(error) => {
                warn!(%error, "discarding persisted cart");

                HydrationOutcome::Discarded
            }
        }
    }

    /// Add `quantity` units of an item.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the ledger rejects the item. Observers are told through
    /// [`CartObserver::on_rejected`] as well.
    pub fn add(&mut self, item: NewLineItem, quantity: u32) -> Result<(), LedgerError> {
        self.mark_ready();

        let result = self.cart.add(item, quantity).map(|()| true);

        self.settle(result)?;

        Ok(())
    }

    /// Remove a line. Missing keys change nothing and are not persisted.
    pub fn remove(&mut self, key: &LineKey) -> Option<LineItem> {
        self.mark_ready();

        let removed = self.cart.remove(key)?;

        self.changed();

        Some(removed)
    }

    /// Change a line's quantity by `delta`, never below 1, returning whether it changed.
    /// Updates that change nothing are not persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the new quantity would exceed the stock ceiling.
    /// Observers are told through [`CartObserver::on_rejected`] as well.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> Result<bool, LedgerError> {
        self.mark_ready();

        let result = self.cart.update_quantity(key, delta);

        self.settle(result)
    }

    /// Empty the cart and remove it from storage.
    pub fn clear(&mut self) {
        self.mark_ready();
        self.cart.clear();
        self.store.clear();

        for observer in &mut self.observers {
            observer.on_change(&self.cart);
        }
    }

    /// Attach a coupon with an already resolved discount.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the coupon is unusable; the cart is unchanged.
    pub fn apply_coupon(
        &mut self,
        code: impl Into<String>,
        discount: Money<'static, Currency>,
    ) -> Result<(), CouponError> {
        self.mark_ready();
        self.cart.apply_coupon(code, discount)?;
        self.changed();

        Ok(())
    }

    /// Detach the coupon. Nothing is persisted when no coupon was attached.
    pub fn remove_coupon(&mut self) -> Option<CouponAttachment> {
        self.mark_ready();

        let removed = self.cart.remove_coupon()?;

        self.changed();

        Some(removed)
    }

    /// Select a shipping quote, or clear the selection with `None`.
    pub fn set_shipping(&mut self, quote: Option<ShippingQuote>) {
        self.mark_ready();

        if quote.is_none() && self.cart.shipping().is_none() {
            return;
        }

        self.cart.set_shipping(quote);
        self.changed();
    }

    /// Clear the shipping selection. Nothing is persisted when none was selected.
    pub fn remove_shipping(&mut self) -> Option<ShippingAttachment> {
        self.mark_ready();

        let removed = self.cart.remove_shipping()?;

        self.changed();

        Some(removed)
    }

    fn settle(&mut self, result: Result<bool, LedgerError>) -> Result<bool, LedgerError> {
        match &result {
            Ok(true) => self.changed(),
            Ok(false) => {}
            Err(error) => {
                for observer in &mut self.observers {
                    observer.on_rejected(error);
                }
            }
        }

        result
    }

    fn changed(&mut self) {
        match self.cart.to_envelope() {
            Ok(envelope) => self.store.write(envelope),
            Err(error) => warn!(%error, "cart not persisted"),
        }

        for observer in &mut self.observers {
            observer.on_change(&self.cart);
        }
    }

    fn mark_ready(&mut self) {
        if self.lifecycle == Lifecycle::Ready {
            return;
        }

        debug!("cart session ready");

        self.lifecycle = Lifecycle::Ready;

        for observer in &mut self.observers {
            observer.on_ready(&self.cart);
        }
    }
}
