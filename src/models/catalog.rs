//! Catalog view models served to the frontend.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Cents, CloverMerchantId, ItemId};

/// Id of the synthetic bucket holding items without a category.
pub const UNCATEGORIZED_ID: &str = "uncategorized";

/// Display name of the synthetic uncategorized bucket.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// Something purchasable inside a category: an item variant, or the item
/// itself when it has none. Prices are in decimal currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// Variant id, or the item id for variant-less items.
    pub id: String,
    /// `"{item} ({variant})"`, or the bare item name.
    pub name: String,
    /// Price in currency units (cents / 100).
    pub price: f64,
}

/// A category with the variations of every item that belongs to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Clover category id, or [`UNCATEGORIZED_ID`].
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Member variations in item order.
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Category {
    /// Creates a category with no variations.
    #[inline]
    #[must_use]
    pub const fn empty(id: CategoryId, name: String) -> Self {
        Self {
            id,
            name,
            variations: Vec::new(),
        }
    }

    /// Creates the empty synthetic uncategorized bucket.
    #[inline]
    #[must_use]
    pub fn uncategorized() -> Self {
        Self::empty(
            CategoryId::new(UNCATEGORIZED_ID.to_owned()),
            UNCATEGORIZED_NAME.to_owned(),
        )
    }
}

/// A variant as reported by the plain item listing (prices in cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariation {
    /// Variant id.
    pub id: String,
    /// Variant name.
    pub name: String,
    /// Price in cents.
    pub price: Cents,
}

/// An item as reported by the plain item listing (prices in cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item id.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Base price in cents.
    pub price: Cents,
    /// Variants, one per provider variant; empty when the item has none.
    #[serde(default)]
    pub variations: Vec<ItemVariation>,
}

/// Body of `GET /merchants/{merchant_id}/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantItemsResponse {
    /// Clover merchant id the items belong to.
    pub merchant_id: CloverMerchantId,
    /// Items in provider order.
    pub items: Vec<CatalogItem>,
}
