//! Brands
//!
//! Several storefronts can run on the same device. Each gets its own storage key, so carts
//! never leak between them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every brand's storage key.
pub const STORAGE_KEY_PREFIX: &str = "cart-storage";

/// Errors parsing a brand identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrandError {
    /// The identifier is blank.
    #[error("brand identifier is empty")]
    Empty,

    /// The identifier contains a character outside `[a-z0-9-_]`.
    #[error("brand identifier {0:?} may only contain lowercase letters, digits, '-' and '_'")]
    InvalidCharacter(String),
}

/// A storefront slug such as `acme` or `acme-outlet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrandId(String);

impl BrandId {
    /// Validate and wrap a slug.
    ///
    /// # Errors
    ///
    /// Returns a [`BrandError`] if the slug is empty or has characters outside `[a-z0-9-_]`.
    pub fn new(slug: impl Into<String>) -> Result<Self, BrandError> {
        let slug = slug.into();

        if slug.is_empty() {
            return Err(BrandError::Empty);
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(BrandError::InvalidCharacter(slug));
        }

        Ok(Self(slug))
    }

    /// The slug
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this brand's cart is persisted.
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}:{}", self.0)
    }
}

impl Default for BrandId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for BrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BrandId {
    type Err = BrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for BrandId {
    type Error = BrandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BrandId> for String {
    fn from(brand: BrandId) -> Self {
        brand.0
    }
}
