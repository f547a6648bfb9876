//! Item detail request/response and listing pagination.

use serde::{Deserialize, Serialize};

use super::{CloverMerchantId, ItemId};

/// Label used when an item has no variants.
pub const STANDARD_TYPE: &str = "Standard";

/// Body of `POST /items/details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetailRequest {
    /// Clover merchant id.
    pub merchant_id: CloverMerchantId,
    /// Clover item id.
    pub item_id: ItemId,
}

/// Response of `POST /items/details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetailResponse {
    /// Clover merchant id.
    pub merchant_id: CloverMerchantId,
    /// Merchant business name.
    pub merchant_name: String,
    /// Clover item id.
    pub item_id: ItemId,
    /// Item name.
    pub item_name: String,
    /// Variant names, or `["Standard"]` when the item has none.
    pub types: Vec<String>,
}

/// Optional `limit`/`offset` forwarded to Clover list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Records to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl Page {
    /// Query pairs to append to a Clover URL; empty when nothing is set.
    #[inline]
    #[must_use]
    pub fn query_pairs(self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}
