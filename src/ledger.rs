//! Ledger

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, warn};

use crate::items::{LineItem, LineKey, NewLineItem};

/// Reasons a ledger mutation was rejected. The ledger is unchanged when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The resulting quantity would exceed the known stock ceiling.
    #[error("{key}: quantity {requested} exceeds stock of {stock}")]
    StockExceeded {
        /// Line that was being changed
        key: LineKey,

        /// Quantity the line would have ended up with
        requested: u64,

        /// Stock ceiling in force
        stock: u32,
    },

    /// An item's currency differs from the ledger currency (item currency, ledger currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The resulting quantity does not fit in a `u32`.
    #[error("{0}: quantity overflow")]
    QuantityOverflow(LineKey),
}

/// Ordered set of distinct line items, at most one per [`LineKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    lines: Vec<LineItem>,
    currency: &'static Currency,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Ledger {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add `requested` units of an item, merging into an existing line with the same key.
    ///
    /// A requested quantity of zero counts as one. The stock ceiling checked is the incoming
    /// item's, falling back to the one already recorded on the line.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::StockExceeded`]: the merged quantity would exceed the stock ceiling.
    /// - [`LedgerError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`LedgerError::QuantityOverflow`]: the merged quantity does not fit in a `u32`.
    pub fn add(&mut self, item: NewLineItem, requested: u32) -> Result<(), LedgerError> {
        let item_currency = item.price().currency();

        if item_currency != self.currency {
            return Err(LedgerError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let requested = requested.max(1);
        let existing = self.position(item.key());

        let (existing_quantity, existing_stock) = existing
            .and_then(|idx| self.lines.get(idx))
            .map_or((0, None), |line| (line.quantity(), line.stock()));

        let stock = item.stock().or(existing_stock);
        let quantity = u64::from(existing_quantity) + u64::from(requested);

        if let Some(stock) = stock.filter(|&stock| quantity > u64::from(stock)) {
            warn!(
                key = %item.key(),
                quantity,
                stock,
                "rejected add: stock exceeded"
            );

            return Err(LedgerError::StockExceeded {
                key: item.key().clone(),
                requested: quantity,
                stock,
            });
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| LedgerError::QuantityOverflow(item.key().clone()))?;

        match existing.and_then(|idx| self.lines.get_mut(idx)) {
            Some(line) => {
                line.set_quantity(quantity);
                line.set_stock(stock);
            }
            None => self.lines.push(item.into_line(quantity)),
        }

        Ok(())
    }

    /// Remove the line with the given key, returning it. Missing keys are a no-op.
    pub fn remove(&mut self, key: &LineKey) -> Option<LineItem> {
        let Some(idx) = self.position(key) else {
            debug!(%key, "remove ignored: line not in cart");

            return None;
        };

        Some(self.lines.remove(idx))
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Use [`Ledger::remove`] to delete a line; decrementing never does. Returns whether the
    /// quantity changed, so missing keys and clamped no-ops report `false`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StockExceeded`] if the new quantity would exceed the line's
    /// stock ceiling, or [`LedgerError::QuantityOverflow`] if it does not fit in a `u32`.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> Result<bool, LedgerError> {
        let Some(line) = self.lines.iter_mut().find(|line| line.key() == key) else {
            debug!(%key, "quantity update ignored: line not in cart");

            return Ok(false);
        };

        let quantity = i64::from(line.quantity()).saturating_add(delta).max(1);

        if let Some(stock) = line.stock().filter(|&stock| quantity > i64::from(stock)) {
            warn!(%key, quantity, stock, "rejected quantity update: stock exceeded");

            return Err(LedgerError::StockExceeded {
                key: key.clone(),
                requested: quantity.unsigned_abs(),
                stock,
            });
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| LedgerError::QuantityOverflow(key.clone()))?;

        if quantity == line.quantity() {
            return Ok(false);
        }

        line.set_quantity(quantity);

        Ok(true)
    }

    /// Put back a line read from storage, repairing rather than rejecting it.
    ///
    /// Quantities are floored at 1 and clamped to the stock ceiling, lines whose stock cannot
    /// hold a single unit are dropped, and duplicate keys are merged. Returns whether the line
    /// was kept.
    pub(crate) fn restore(&mut self, line: LineItem) -> bool {
        if line.price().currency() != self.currency {
            warn!(key = %line.key(), "dropping restored line priced in another currency");

            return false;
        }

        if line.stock() == Some(0) {
            debug!(key = %line.key(), "dropping restored line without stock");

            return false;
        }

        let clamp = |quantity: u32, stock: Option<u32>| {
            stock.map_or(quantity, |stock| quantity.min(stock)).max(1)
        };

        if let Some(existing) = self.lines.iter_mut().find(|existing| existing.key() == line.key()) {
            let stock = line.stock().or(existing.stock());
            let merged = existing.quantity().saturating_add(line.quantity());

            existing.set_stock(stock);
            existing.set_quantity(clamp(merged, stock));
        } else {
            let mut line = line;
            let quantity = clamp(line.quantity(), line.stock());

            line.set_quantity(quantity);
            self.lines.push(line);
        }

        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Get a line by key.
    pub fn get(&self, key: &LineKey) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.key() == key)
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter()
    }

    /// Sum of all line quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the ledger.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.key() == key)
    }
}
