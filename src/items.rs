//! Items

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Image references attached to an item, kept inline for the common case.
pub type Images = SmallVec<[String; 4]>;

/// Catalog product identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Composite identity of a line item: one product in one size and color.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    product: ProductId,
    size: String,
    color: String,
}

impl LineKey {
    /// Creates a key from its parts.
    pub fn new(
        product: impl Into<ProductId>,
        size: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            size: size.into(),
            color: color.into(),
        }
    }

    /// Product identifier
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Size label
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Color label
    pub fn color(&self) -> &str {
        &self.color
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product, self.size, self.color)
    }
}

/// An item about to be added to the ledger.
///
/// The price is captured here and never re-fetched from the catalog afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLineItem {
    key: LineKey,
    name: String,
    price: Money<'static, Currency>,
    images: Images,
    variant: Option<String>,
    stock: Option<u32>,
}

impl NewLineItem {
    /// Creates a new item with no images, variant or stock ceiling.
    pub fn new(key: LineKey, name: impl Into<String>, price: Money<'static, Currency>) -> Self {
        Self {
            key,
            name: name.into(),
            price,
            images: Images::new(),
            variant: None,
            stock: None,
        }
    }

    /// Sets the image references.
    #[must_use]
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the catalog variant identifier.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Sets the stock ceiling for this item.
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Returns the composite key.
    pub fn key(&self) -> &LineKey {
        &self.key
    }

    /// Returns the unit price.
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }

    /// Returns the stock ceiling, if known.
    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    pub(crate) fn into_line(self, quantity: u32) -> LineItem {
        LineItem {
            key: self.key,
            name: self.name,
            price: self.price,
            images: self.images,
            variant: self.variant,
            stock: self.stock,
            quantity,
        }
    }
}

/// A ledger entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    key: LineKey,
    name: String,
    price: Money<'static, Currency>,
    images: Images,
    variant: Option<String>,
    stock: Option<u32>,
    quantity: u32,
}

impl LineItem {
    /// Returns the composite key.
    pub fn key(&self) -> &LineKey {
        &self.key
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price captured when the item was added.
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }

    /// Returns the image references.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Returns the catalog variant identifier.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Returns the stock ceiling, if known.
    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    /// Returns the quantity; always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity, in minor units, saturating at the `i64` bounds.
    pub fn line_total_minor(&self) -> i64 {
        self.price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity))
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Money<'static, Currency> {
        Money::from_minor(self.line_total_minor(), self.price.currency())
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_stock(&mut self, stock: Option<u32>) {
        self.stock = stock;
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BRL;

    use super::*;

    fn shirt() -> NewLineItem {
        NewLineItem::new(
            LineKey::new("A", "M", "red"),
            "Shirt",
            Money::from_minor(100_00, BRL),
        )
    }

    #[test]
    fn line_key_display_joins_parts() {
        let key = LineKey::new("A", "M", "red");

        assert_eq!(key.to_string(), "A/M/red");
    }

    #[test]
    fn line_keys_differ_by_size_and_color() {
        let medium = LineKey::new("A", "M", "red");
        let large = LineKey::new("A", "L", "red");
        let blue = LineKey::new("A", "M", "blue");

        assert_ne!(medium, large);
        assert_ne!(medium, blue);
        assert_eq!(medium, LineKey::new("A", "M", "red"));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let item = shirt()
            .with_images(["front.jpg", "back.jpg"])
            .with_variant("A-M-red")
            .with_stock(3)
            .into_line(2);

        assert_eq!(item.images(), ["front.jpg", "back.jpg"]);
        assert_eq!(item.variant(), Some("A-M-red"));
        assert_eq!(item.stock(), Some(3));
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.name(), "Shirt");
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = shirt().into_line(3);

        assert_eq!(item.line_total(), Money::from_minor(300_00, BRL));
    }

    #[test]
    fn line_total_saturates() {
        let item = NewLineItem::new(
            LineKey::new("A", "M", "red"),
            "Gold",
            Money::from_minor(i64::MAX, BRL),
        )
        .into_line(2);

        assert_eq!(item.line_total_minor(), i64::MAX);
    }
}
