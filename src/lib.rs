//! Tote
//!
//! Tote is a shopping cart engine: a line-item ledger with stock ceilings, an optional coupon
//! and shipping selection, totals that are always derived and never stored, and persistence
//! with a time to live so a cart survives restarts but not forever.

pub mod brands;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod items;
pub mod ledger;
pub mod money;
pub mod observer;
pub mod persistence;
pub mod prelude;
pub mod session;
pub mod shipping;
pub mod summary;
pub mod totals;
