//! Property-based tests for cart invariants
//!
//! Arbitrary sequences of ledger operations, coupons and shipping quotes must never break the
//! stock ceiling, the quantity floor or the total formula, and persisted carts must come back
//! with the same totals.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use proptest::prelude::*;
use rusty_money::{Money, iso::BRL};

use tote::{persistence::ManualClock, prelude::*};

const KEYS: [(&str, &str, &str); 3] = [("A", "M", "red"), ("A", "L", "red"), ("B", "M", "blue")];

#[derive(Debug, Clone)]
enum Op {
    Add { key: usize, quantity: u32 },
    Update { key: usize, delta: i64 },
    Remove { key: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..KEYS.len(), 0u32..6).prop_map(|(key, quantity)| Op::Add { key, quantity }),
        2 => (0..KEYS.len(), -20i64..20).prop_map(|(key, delta)| Op::Update { key, delta }),
        1 => (0..KEYS.len()).prop_map(|key| Op::Remove { key }),
    ]
}

fn key(idx: usize) -> LineKey {
    let (product, size, color) = KEYS.get(idx).copied().unwrap_or(KEYS[0]);

    LineKey::new(product, size, color)
}

fn item(idx: usize, price: i64, stock: Option<u32>) -> NewLineItem {
    let item = NewLineItem::new(key(idx), "Item", Money::from_minor(price, BRL));

    match stock {
        Some(stock) => item.with_stock(stock),
        None => item,
    }
}

fn apply(cart: &mut Cart, op: &Op, prices: &[i64], stocks: &[Option<u32>]) {
    match *op {
        Op::Add { key: idx, quantity } => {
            let price = prices.get(idx).copied().unwrap_or_default();
            let stock = stocks.get(idx).copied().flatten();

            cart.add(item(idx, price, stock), quantity).ok();
        }
        Op::Update { key: idx, delta } => {
            cart.update_quantity(&key(idx), delta).ok();
        }
        Op::Remove { key: idx } => {
            cart.remove(&key(idx));
        }
    }
}

fn price_text(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

proptest! {
    /// Repeated adds of one key sum their quantities until the stock ceiling would be crossed
    #[test]
    fn key_merge_sums_accepted_quantities(
        quantities in prop::collection::vec(0u32..5, 1..20),
        stock in prop::option::of(1u32..30),
    ) {
        let mut cart = Cart::new(BRL);
        let mut expected = 0u32;

        for quantity in quantities {
            let requested = quantity.max(1);
            let accepted = cart.add(item(0, 1_00, stock), quantity).is_ok();

            prop_assert_eq!(
                accepted,
                stock.is_none_or(|stock| expected + requested <= stock)
            );

            if accepted {
                expected += requested;
            }
        }

        prop_assert!(cart.ledger().len() <= 1);
        prop_assert_eq!(cart.items().next().map_or(0, LineItem::quantity), expected);
    }

    /// No operation sequence leaves a line above its stock or below one unit
    #[test]
    fn quantities_stay_within_floor_and_ceiling(
        ops in prop::collection::vec(op(), 1..40),
        prices in prop::array::uniform3(0i64..100_000),
        stocks in prop::array::uniform3(prop::option::of(1u32..10)),
    ) {
        let mut cart = Cart::new(BRL);

        for op in &ops {
            apply(&mut cart, op, &prices, &stocks);

            for line in cart.items() {
                prop_assert!(line.quantity() >= 1);

                if let Some(stock) = line.stock() {
                    prop_assert!(line.quantity() <= stock);
                }
            }
        }
    }

    /// Large negative deltas clamp to one unit and never remove the line
    #[test]
    fn decrement_clamps_to_one(start in 1u32..50, delta in i64::MIN..0) {
        let mut cart = Cart::new(BRL);

        cart.add(item(0, 1_00, None), start)?;
        cart.update_quantity(&key(0), delta)?;

        prop_assert_eq!(cart.items().next().map(LineItem::quantity), Some(1));
    }

    /// Totals always equal max(0, subtotal - discount) + shipping, recomputed from the lines
    #[test]
    fn totals_follow_formula(
        ops in prop::collection::vec(op(), 0..30),
        prices in prop::array::uniform3(0i64..100_000),
        discount in prop::option::of(0i64..500_000),
        shipping in prop::option::of(0i64..10_000),
    ) {
        let mut cart = Cart::new(BRL);

        for op in &ops {
            apply(&mut cart, op, &prices, &[None, None, None]);
        }

        if let Some(discount) = discount {
            cart.apply_coupon("PROP", Money::from_minor(discount, BRL))?;
        }

        cart.set_shipping(shipping.map(|minor| ShippingQuote::new("PAC", price_text(minor), "5")));

        let subtotal: i64 = cart
            .items()
            .map(|line| line.price().to_minor_units() * i64::from(line.quantity()))
            .sum();
        let expected = (subtotal - discount.unwrap_or(0)).max(0) + shipping.unwrap_or(0);

        let totals = cart.totals();

        prop_assert_eq!(totals.subtotal().to_minor_units(), subtotal);
        prop_assert_eq!(totals.total().to_minor_units(), expected);
        prop_assert!(totals.total().to_minor_units() >= 0);
        prop_assert_eq!(totals, derive_totals(cart.ledger(), cart.coupon(), cart.shipping()));
    }

    /// A discount above the subtotal leaves exactly the shipping cost to pay
    #[test]
    fn oversized_discount_leaves_shipping(
        price in 0i64..10_000,
        quantity in 1u32..5,
        extra in 1i64..10_000,
        shipping in 0i64..10_000,
    ) {
        let mut cart = Cart::new(BRL);

        cart.add(item(0, price, None), quantity)?;

        let subtotal = cart.totals().subtotal().to_minor_units();

        cart.apply_coupon("BIG", Money::from_minor(subtotal + extra, BRL))?;
        cart.set_shipping(Some(ShippingQuote::new("PAC", price_text(shipping), "5")));

        prop_assert_eq!(cart.totals().total().to_minor_units(), shipping);
    }

    /// Clearing drops lines, coupon and shipping, and zeroes every total
    #[test]
    fn clear_resets_everything(
        ops in prop::collection::vec(op(), 0..20),
        prices in prop::array::uniform3(0i64..100_000),
    ) {
        let mut cart = Cart::new(BRL);

        for op in &ops {
            apply(&mut cart, op, &prices, &[None, None, None]);
        }

        cart.apply_coupon("PROP", Money::from_minor(10_00, BRL))?;
        cart.set_shipping(Some(ShippingQuote::new("PAC", "12.00", "5")));
        cart.clear();

        prop_assert!(cart.is_empty());
        prop_assert!(cart.coupon().is_none());
        prop_assert!(cart.shipping().is_none());
        prop_assert_eq!(cart.totals(), Totals::zero(BRL));
    }

    /// Entries older than the TTL read as absent, and stay absent because they were purged
    #[test]
    fn expired_entries_are_purged(age_mins in 0i64..(24 * 60)) {
        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let store = PersistedStore::new(MemoryStorage::new(), "cart-storage:prop")
            .with_clock(Arc::clone(&clock));

        store.write(Envelope::default());
        clock.advance(SignedDuration::from_mins(age_mins));

        let expired = SignedDuration::from_mins(age_mins) > DEFAULT_TTL;

        prop_assert_eq!(store.read().is_none(), expired);
        prop_assert_eq!(store.read().is_none(), expired);
    }

    /// A persisted cart restores to the same totals as the session that wrote it
    #[test]
    fn rehydration_reproduces_totals(
        ops in prop::collection::vec(op(), 0..30),
        prices in prop::array::uniform3(0i64..100_000),
        stocks in prop::array::uniform3(prop::option::of(1u32..10)),
        discount in prop::option::of(0i64..50_000),
        shipping in prop::option::of(0i64..10_000),
    ) {
        let mut cart = Cart::new(BRL);

        for op in &ops {
            apply(&mut cart, op, &prices, &stocks);
        }

        if let Some(discount) = discount {
            cart.apply_coupon("PROP", Money::from_minor(discount, BRL))?;
        }

        cart.set_shipping(shipping.map(|minor| ShippingQuote::new("PAC", price_text(minor), "5")));

        let store = PersistedStore::new(MemoryStorage::new(), "cart-storage:prop")
            .with_clock(ManualClock::default());

        store.write(cart.to_envelope()?);

        let envelope = store.read().ok_or_else(|| TestCaseError::fail("envelope missing"))?;
        let restored = Cart::from_envelope(envelope, BRL)?;

        prop_assert_eq!(restored.totals(), cart.totals());
        prop_assert_eq!(restored, cart);
    }
}
