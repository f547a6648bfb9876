//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! [`super::Storage`]. Ideal for unit and integration tests where a
//! database is undesirable.

use core::future::{self, Future};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret as _, SecretString};

use crate::error::{BffError, Result};
use crate::models::{
    CloverMerchantId, ItemId, Merchant, MerchantId, MerchantToken, NewMerchant, NewMerchantToken,
    NewRecommendation, Recommendation, RecommendationId, TokenId, User, UserId,
};

/// Thread-safe in-memory storage for testing.
///
/// Keys are assigned sequentially from 1, like an autoincrement column.
///
/// # Example
///
/// ```rust
/// use clover_bff::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // CloverBff::builder().storage(storage).build()
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Last assigned primary key, shared across tables.
    last_id: i64,
    /// Stored merchants.
    merchants: Vec<Merchant>,
    /// Stored tokens.
    tokens: Vec<StoredToken>,
    /// Stored users.
    users: Vec<User>,
    /// Stored recommendations.
    recommendations: Vec<Recommendation>,
}

impl Inner {
    /// Hands out the next primary key.
    const fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.saturating_add(1);
        self.last_id
    }
}

/// A token row; the secret is kept as plain text like a database column.
#[derive(Debug)]
struct StoredToken {
    /// Primary key.
    id: TokenId,
    /// Owning merchant.
    merchant_id: MerchantId,
    /// Token text.
    token: String,
    /// Issue time.
    created_at: DateTime<Utc>,
}

impl StoredToken {
    /// Materializes the public model.
    fn to_model(&self) -> MerchantToken {
        MerchantToken {
            id: self.id,
            merchant_id: self.merchant_id,
            token: SecretString::from(self.token.clone()),
            created_at: self.created_at,
        }
    }
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> BffError {
    BffError::Storage(err.to_string().into())
}

impl super::Storage for InMemoryStorage {
    #[inline]
    fn merchant_by_clover_id(
        &self,
        clover_merchant_id: &CloverMerchantId,
    ) -> impl Future<Output = Result<Option<Merchant>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .merchants
                .iter()
                .find(|merchant| merchant.clover_merchant_id == *clover_merchant_id)
                .cloned()
        }))
    }

    #[inline]
    fn insert_merchant(
        &self,
        merchant: NewMerchant,
    ) -> impl Future<Output = Result<Merchant>> + Send {
        future::ready(
            self.with_lock(|inner| {
                if inner
                    .merchants
                    .iter()
                    .any(|existing| existing.clover_merchant_id == merchant.clover_merchant_id)
                {
                    return Err(BffError::Storage(
                        format!("merchant {} already exists", merchant.clover_merchant_id).into(),
                    ));
                }
                let stored = Merchant {
                    id: MerchantId::new(inner.next_id()),
                    clover_merchant_id: merchant.clover_merchant_id,
                    name: merchant.name,
                };
                inner.merchants.push(stored.clone());
                Ok(stored)
            })
            .and_then(core::convert::identity),
        )
    }

    #[inline]
    fn latest_token(
        &self,
        merchant_id: MerchantId,
    ) -> impl Future<Output = Result<Option<MerchantToken>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .tokens
                .iter()
                .filter(|token| token.merchant_id == merchant_id)
                .max_by_key(|token| (token.created_at, token.id.into_inner()))
                .map(StoredToken::to_model)
        }))
    }

    #[inline]
    fn insert_token(
        &self,
        token: NewMerchantToken,
    ) -> impl Future<Output = Result<TokenId>> + Send {
        future::ready(self.with_lock(|inner| {
            let id = TokenId::new(inner.next_id());
            inner.tokens.push(StoredToken {
                id,
                merchant_id: token.merchant_id,
                token: token.token.expose_secret().to_owned(),
                created_at: token.created_at,
            });
            id
        }))
    }

    #[inline]
    fn user(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner.users.iter().find(|user| user.id == user_id).cloned()
        }))
    }

    #[inline]
    fn insert_user(&self, name: String) -> impl Future<Output = Result<User>> + Send {
        future::ready(self.with_lock(|inner| {
            let user = User {
                id: UserId::new(inner.next_id()),
                name,
            };
            inner.users.push(user.clone());
            user
        }))
    }

    #[inline]
    fn create_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> impl Future<Output = Result<Recommendation>> + Send {
        future::ready(self.with_lock(|inner| {
            let stored = Recommendation {
                id: RecommendationId::new(inner.next_id()),
                user_id: recommendation.user_id,
                item_id: recommendation.item_id,
            };
            inner.recommendations.push(stored.clone());
            stored
        }))
    }

    #[inline]
    fn recommendations(&self) -> impl Future<Output = Result<Vec<Recommendation>>> + Send {
        future::ready(self.with_lock(|inner| inner.recommendations.clone()))
    }

    #[inline]
    fn recommendation(
        &self,
        id: RecommendationId,
    ) -> impl Future<Output = Result<Option<Recommendation>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .recommendations
                .iter()
                .find(|recommendation| recommendation.id == id)
                .cloned()
        }))
    }

    #[inline]
    fn latest_recommendation_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Recommendation>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .recommendations
                .iter()
                .filter(|recommendation| recommendation.user_id == user_id)
                .max_by_key(|recommendation| recommendation.id.into_inner())
                .cloned()
        }))
    }

    #[inline]
    fn set_recommendation_item(
        &self,
        id: RecommendationId,
        item_id: ItemId,
    ) -> impl Future<Output = Result<Recommendation>> + Send {
        future::ready(
            self.with_lock(|inner| {
                let recommendation = inner
                    .recommendations
                    .iter_mut()
                    .find(|recommendation| recommendation.id == id)
                    .ok_or_else(|| BffError::NotFound(format!("Recommendation {id} not found")))?;
                recommendation.item_id = item_id;
                Ok(recommendation.clone())
            })
            .and_then(core::convert::identity),
        )
    }
}
