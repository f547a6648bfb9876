//! Raw response shapes returned by the Clover REST API.
//!
//! These are parsed strictly: a payload missing one of the fields below is
//! rejected rather than silently defaulted. Unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

use super::{CategoryId, Cents, CloverMerchantId, ItemId};

/// Clover's collection envelope: `{"elements": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Elements<T> {
    /// The wrapped records.
    pub elements: Vec<T>,
}

/// An expanded sub-collection of an item (`variants`, `categories`).
///
/// Clover wraps expansions in an `elements` envelope; a bare JSON array is
/// accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expanded<T>(Vec<T>);

impl<T> Expanded<T> {
    /// Returns the expanded records.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Consumes the wrapper and returns the records.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> From<Vec<T>> for Expanded<T> {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self(value)
    }
}

/// Wire forms accepted for [`Expanded`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpandedShape<T> {
    /// `[...]`
    List(Vec<T>),
    /// `{"elements": [...]}`
    Envelope {
        /// The wrapped records.
        elements: Vec<T>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Expanded<T> {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ExpandedShape::deserialize(deserializer)? {
            ExpandedShape::List(items) | ExpandedShape::Envelope { elements: items } => {
                Self(items)
            }
        })
    }
}

/// Merchant profile (`GET /v3/merchants/{mId}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloverMerchant {
    /// Clover merchant id.
    pub id: CloverMerchantId,
    /// Business name.
    pub name: String,
}

/// A variant of an inventory item, e.g. a size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloverVariant {
    /// Variant id.
    pub id: String,
    /// Variant label, e.g. `"Large"`.
    pub name: String,
    /// Price in cents.
    pub price: Cents,
}

/// Reference from an item to a category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRef {
    /// Referenced category id.
    pub id: CategoryId,
}

/// An inventory item, optionally with expanded variants and categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloverItem {
    /// Item id.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Base price in cents.
    pub price: Cents,
    /// Expanded variants, absent when not requested or not defined.
    #[serde(default)]
    pub variants: Option<Expanded<CloverVariant>>,
    /// Expanded category membership.
    #[serde(default)]
    pub categories: Option<Expanded<CategoryRef>>,
}

impl CloverItem {
    /// Declared variants, empty when none were returned.
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[CloverVariant] {
        self.variants.as_ref().map(Expanded::as_slice).unwrap_or_default()
    }

    /// Declared category references, empty when none were returned.
    #[inline]
    #[must_use]
    pub fn category_refs(&self) -> &[CategoryRef] {
        self.categories.as_ref().map(Expanded::as_slice).unwrap_or_default()
    }
}

/// An inventory category (`GET .../categories`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloverCategory {
    /// Category id.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
}

/// A modifier group (`GET .../modifier_groups`), e.g. "Milk options".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierGroup {
    /// Modifier group id.
    pub id: String,
    /// Display name.
    pub name: String,
}
