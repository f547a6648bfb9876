//! Data models for the Clover backend-for-frontend.
//!
//! This module contains the raw Clover wire shapes, the catalog view models
//! served to the frontend, local persisted entities, and newtype ID
//! wrappers.

mod catalog;
mod clover;
mod ids;
mod item;
mod merchant;
mod money;
mod recommendation;

pub use catalog::{
    CatalogItem, Category, ItemVariation, MerchantItemsResponse, UNCATEGORIZED_ID,
    UNCATEGORIZED_NAME, Variation,
};
pub use chrono::{DateTime, Utc};
pub use clover::{
    CategoryRef, CloverCategory, CloverItem, CloverMerchant, CloverVariant, Elements, Expanded,
    ModifierGroup,
};
pub use ids::{
    CategoryId, CloverMerchantId, ItemId, MerchantId, RecommendationId, TokenId, UserId,
};
pub use item::{ItemDetailRequest, ItemDetailResponse, Page, STANDARD_TYPE};
pub use merchant::{Merchant, MerchantInfo, MerchantToken, NewMerchant, NewMerchantToken};
pub use money::Cents;
pub use recommendation::{NewRecommendation, Recommendation, RecommendationUpdate, User};
