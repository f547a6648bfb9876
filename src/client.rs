//! HTTP client for the Clover REST API.
//!
//! Every call is a single authenticated `GET`; there is no retry, backoff
//! or circuit breaking. Transport failures and non-success statuses are
//! mapped onto [`crate::error::BffError`] and handed back to the caller.

mod async_client;

pub use async_client::{CloverClient, CloverClientBuilder};

/// Default Clover host (sandbox).
pub const DEFAULT_BASE_URL: &str = "https://apisandbox.dev.clover.com";

/// Expansion used for a single item lookup.
const ITEM_EXPAND: &str = "variants";

/// Expansion used for the item listing.
const ITEMS_EXPAND: &str = "variants,categories";

/// Items collection path segment.
const ITEMS_PATH: &str = "items";

/// Categories collection path segment.
const CATEGORIES_PATH: &str = "categories";

/// Modifier groups collection path segment.
const MODIFIER_GROUPS_PATH: &str = "modifier_groups";
