//! Pluggable storage backends for merchants, tokens, users and
//! recommendations.
//!
//! This module defines the async [`Storage`] trait. [`InMemoryStorage`] is
//! a zero-setup backend for tests; [`SqliteStorage`] persists to SQLite.

mod memory;
#[cfg(feature = "storage-sqlite")]
mod sqlite;

use core::future::Future;

pub use memory::InMemoryStorage;
#[cfg(feature = "storage-sqlite")]
pub use sqlite::SqliteStorage;

use crate::error::Result;
use crate::models::{
    CloverMerchantId, ItemId, Merchant, MerchantId, MerchantToken, NewMerchant, NewMerchantToken,
    NewRecommendation, Recommendation, RecommendationId, TokenId, User, UserId,
};

/// Async storage backend for local state.
///
/// All methods take `&self`; implementations use interior
/// mutability (e.g. `Mutex`) or a connection pool.
pub trait Storage: core::fmt::Debug + Send + Sync {
    /// Looks up a merchant by its Clover identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn merchant_by_clover_id(
        &self,
        clover_merchant_id: &CloverMerchantId,
    ) -> impl Future<Output = Result<Option<Merchant>>> + Send;

    /// Inserts a merchant and returns it with its assigned key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write, including
    /// when the Clover id is already taken.
    fn insert_merchant(
        &self,
        merchant: NewMerchant,
    ) -> impl Future<Output = Result<Merchant>> + Send;

    /// Returns the token with the latest `created_at` for a merchant.
    ///
    /// Ties are broken by the higher token id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn latest_token(
        &self,
        merchant_id: MerchantId,
    ) -> impl Future<Output = Result<Option<MerchantToken>>> + Send;

    /// Appends a token for a merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn insert_token(&self, token: NewMerchantToken)
    -> impl Future<Output = Result<TokenId>> + Send;

    /// Looks up a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn user(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Inserts a user and returns it with its assigned key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn insert_user(&self, name: String) -> impl Future<Output = Result<User>> + Send;

    /// Inserts a recommendation. Several per user are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn create_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> impl Future<Output = Result<Recommendation>> + Send;

    /// Returns all recommendations in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn recommendations(&self) -> impl Future<Output = Result<Vec<Recommendation>>> + Send;

    /// Looks up a recommendation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn recommendation(
        &self,
        id: RecommendationId,
    ) -> impl Future<Output = Result<Option<Recommendation>>> + Send;

    /// Returns the most recently inserted recommendation for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn latest_recommendation_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Recommendation>>> + Send;

    /// Overwrites the item of an existing recommendation in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BffError::NotFound`] if no recommendation
    /// has this id, or an error if the storage backend fails to write.
    fn set_recommendation_item(
        &self,
        id: RecommendationId,
        item_id: ItemId,
    ) -> impl Future<Output = Result<Recommendation>> + Send;
}
