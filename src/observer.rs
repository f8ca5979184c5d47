//! Observers

use crate::{cart::Cart, ledger::LedgerError};

/// Receives cart events from a [`CartSession`](crate::session::CartSession).
///
/// Every method has an empty default, so observers only implement what they care about.
#[cfg_attr(test, mockall::automock)]
pub trait CartObserver: Send {
    /// The cart changed; totals are already re-derived.
    fn on_change(&mut self, _cart: &Cart) {}

    /// A ledger mutation was rejected and the cart left as it was.
    fn on_rejected(&mut self, _error: &LedgerError) {}

    /// Hydration finished, or was skipped, and the cart is ready for use.
    fn on_ready(&mut self, _cart: &Cart) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {}
