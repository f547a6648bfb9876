//! High-level backend-for-frontend service.
//!
//! [`CloverBff`] combines the [`CloverClient`] with a [`Storage`] backend
//! and the optional static credentials from configuration. Each public
//! method backs one HTTP route; the router in [`crate::server`] only
//! extracts inputs and serializes outputs.

use secrecy::{ExposeSecret as _, SecretString};

use crate::catalog;
use crate::client::CloverClient;
use crate::error::{BffError, Result};
use crate::models::{
    CatalogItem, Category, CloverMerchantId, ItemDetailRequest, ItemDetailResponse, MerchantInfo,
    MerchantItemsResponse, ModifierGroup, NewRecommendation, Page, Recommendation,
    RecommendationId, RecommendationUpdate, User, UserId,
};
use crate::storage::Storage;

/// Resolves the authoritative access token for a merchant.
///
/// Looks the merchant up by its Clover id, then takes its most recently
/// created token. Nothing is cached and expiry is not checked.
///
/// # Errors
///
/// Returns [`BffError::NotFound`] if the merchant is unknown, has no
/// tokens, or its latest token is empty. Storage failures propagate.
#[inline]
#[tracing::instrument(skip(storage))]
pub async fn resolve_token<S: Storage>(
    storage: &S,
    merchant_id: &CloverMerchantId,
) -> Result<SecretString> {
    let merchant = storage
        .merchant_by_clover_id(merchant_id)
        .await?
        .ok_or_else(|| {
            BffError::NotFound(format!(
                "Merchant with Clover ID {merchant_id} not found in our system."
            ))
        })?;
    let token = storage
        .latest_token(merchant.id)
        .await?
        .filter(|token| !token.token.expose_secret().is_empty())
        .ok_or_else(|| {
            BffError::NotFound(format!(
                "No valid Clover API token found for merchant ID: {merchant_id}"
            ))
        })?;
    tracing::debug!(token_id = %token.id, created_at = %token.created_at, "resolved merchant token");
    Ok(token.token)
}

/// Builder for constructing a [`CloverBff`] service.
#[derive(Debug)]
pub struct CloverBffBuilder<S: Storage> {
    /// Preconfigured HTTP client.
    client: Option<CloverClient>,
    /// Base URL override, used when no client is given.
    base_url: Option<String>,
    /// Storage backend.
    storage: Option<S>,
    /// Static access token from configuration.
    fallback_token: Option<SecretString>,
    /// Static merchant id from configuration.
    fallback_merchant: Option<CloverMerchantId>,
}

impl<S: Storage> CloverBffBuilder<S> {
    /// Uses an already built HTTP client.
    #[inline]
    #[must_use]
    pub fn client(mut self, client: CloverClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Overrides the Clover base URL (useful for testing with a mock server).
    ///
    /// Ignored when [`CloverBffBuilder::client`] is set.
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the storage backend.
    #[inline]
    #[must_use]
    pub fn storage(mut self, storage: S) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the static access token used when no per-merchant token is
    /// stored, and for `GET /merchants`.
    #[inline]
    #[must_use]
    pub fn fallback_token(mut self, token: SecretString) -> Self {
        self.fallback_token = Some(token);
        self
    }

    /// Sets the static merchant id reported by `GET /merchants`.
    #[inline]
    #[must_use]
    pub fn fallback_merchant(mut self, merchant_id: CloverMerchantId) -> Self {
        self.fallback_merchant = Some(merchant_id);
        self
    }

    /// Builds the service.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Unconfigured`] if no storage was provided or the
    /// base URL is invalid.
    #[inline]
    pub fn build(self) -> Result<CloverBff<S>> {
        let storage = self
            .storage
            .ok_or_else(|| BffError::Unconfigured("storage backend is required".to_owned()))?;
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = CloverClient::builder();
                if let Some(url) = self.base_url {
                    builder = builder.base_url(url);
                }
                builder.build()?
            }
        };
        let fallback_token = self
            .fallback_token
            .filter(|token| !token.expose_secret().is_empty());

        Ok(CloverBff {
            client,
            storage,
            fallback_token,
            fallback_merchant: self.fallback_merchant,
        })
    }
}

/// The backend-for-frontend service.
///
/// Stateless apart from its storage; safe to share behind an `Arc`.
#[derive(Debug)]
pub struct CloverBff<S: Storage> {
    /// Low-level HTTP client.
    client: CloverClient,
    /// Storage backend.
    storage: S,
    /// Static access token, never empty.
    fallback_token: Option<SecretString>,
    /// Static merchant id.
    fallback_merchant: Option<CloverMerchantId>,
}

impl<S: Storage> CloverBff<S> {
    /// Creates a new builder for configuring the service.
    #[inline]
    #[must_use]
    pub const fn builder() -> CloverBffBuilder<S> {
        CloverBffBuilder {
            client: None,
            base_url: None,
            storage: None,
            fallback_token: None,
            fallback_merchant: None,
        }
    }

    /// Returns the storage backend.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Fetches a merchant's name and an item's variant names.
    ///
    /// The merchant profile and the item are fetched concurrently with the
    /// merchant's stored token; the first failure wins.
    ///
    /// # Errors
    ///
    /// [`BffError::NotFound`] when no usable token is stored, otherwise
    /// whatever the Clover calls fail with.
    #[tracing::instrument(skip_all, fields(merchant = %request.merchant_id, item = %request.item_id))]
    pub async fn item_details(&self, request: ItemDetailRequest) -> Result<ItemDetailResponse> {
        let token = resolve_token(&self.storage, &request.merchant_id).await?;
        let (merchant, item) = tokio::try_join!(
            self.client.merchant(&request.merchant_id, &token),
            self.client
                .item(&request.merchant_id, &request.item_id, &token),
        )?;
        let types = catalog::item_types(&item);
        Ok(ItemDetailResponse {
            merchant_id: request.merchant_id,
            merchant_name: merchant.name,
            item_id: request.item_id,
            item_name: item.name,
            types,
        })
    }

    /// Lists a merchant's items with their variants, prices in cents.
    ///
    /// # Errors
    ///
    /// [`BffError::Unconfigured`] when no token is available, otherwise
    /// whatever the Clover call fails with.
    #[tracing::instrument(skip_all, fields(merchant = %merchant_id))]
    pub async fn merchant_items(
        &self,
        merchant_id: CloverMerchantId,
        page: Page,
    ) -> Result<MerchantItemsResponse> {
        let token = self.listing_token(&merchant_id).await?;
        let raw = self.client.items(&merchant_id, &token, page).await?;
        let items: Vec<CatalogItem> = catalog::catalog_items(raw);
        tracing::debug!(count = items.len(), "listed items");
        Ok(MerchantItemsResponse { merchant_id, items })
    }

    /// Lists a merchant's categories with the variations filed under each.
    ///
    /// # Errors
    ///
    /// [`BffError::Unconfigured`] when no token is available, otherwise
    /// whatever the Clover calls fail with.
    #[tracing::instrument(skip_all, fields(merchant = %merchant_id))]
    pub async fn merchant_categories(&self, merchant_id: CloverMerchantId) -> Result<Vec<Category>> {
        let token = self.listing_token(&merchant_id).await?;
        let categories = self
            .client
            .categories(&merchant_id, &token, Page::default())
            .await?;
        let items = self
            .client
            .items(&merchant_id, &token, Page::default())
            .await?;
        Ok(catalog::group_by_category(categories, &items))
    }

    /// Lists a merchant's modifier groups.
    ///
    /// # Errors
    ///
    /// [`BffError::Unconfigured`] when no token is available, otherwise
    /// whatever the Clover call fails with.
    #[tracing::instrument(skip_all, fields(merchant = %merchant_id))]
    pub async fn modifier_groups(
        &self,
        merchant_id: CloverMerchantId,
        page: Page,
    ) -> Result<Vec<ModifierGroup>> {
        let token = self.listing_token(&merchant_id).await?;
        self.client.modifier_groups(&merchant_id, &token, page).await
    }

    /// Reports the merchant behind the static credentials.
    ///
    /// # Errors
    ///
    /// [`BffError::Unconfigured`] unless both the static token and the
    /// static merchant id are set, otherwise whatever the Clover call
    /// fails with.
    #[tracing::instrument(skip_all)]
    pub async fn list_merchants(&self) -> Result<Vec<MerchantInfo>> {
        let (Some(token), Some(merchant_id)) = (
            self.fallback_token.as_ref(),
            self.fallback_merchant.as_ref(),
        ) else {
            return Err(BffError::Unconfigured(
                "Clover credentials not configured.".to_owned(),
            ));
        };
        let merchant = self.client.merchant(merchant_id, token).await?;
        Ok(vec![MerchantInfo {
            clover_merchant_id: merchant.id,
            name: merchant.name,
        }])
    }

    /// Records a new recommendation. Earlier ones for the user are kept.
    ///
    /// # Errors
    ///
    /// [`BffError::NotFound`] if the user does not exist, or a storage
    /// error.
    #[tracing::instrument(skip_all, fields(user = %recommendation.user_id))]
    pub async fn create_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<Recommendation> {
        let _user = self.require_user(recommendation.user_id).await?;
        self.storage.create_recommendation(recommendation).await
    }

    /// Returns every recommendation in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>> {
        self.storage.recommendations().await
    }

    /// Returns one recommendation.
    ///
    /// # Errors
    ///
    /// [`BffError::NotFound`] if there is no such recommendation.
    #[inline]
    pub async fn recommendation(&self, id: RecommendationId) -> Result<Recommendation> {
        self.storage
            .recommendation(id)
            .await?
            .ok_or_else(|| BffError::NotFound("Recommendation not found".to_owned()))
    }

    /// Points the user's current recommendation at a new item.
    ///
    /// The current recommendation is the user's most recent one. It is
    /// overwritten in place; when the user has none, one is created.
    ///
    /// # Errors
    ///
    /// [`BffError::NotFound`] if the user does not exist, or a storage
    /// error.
    #[tracing::instrument(skip_all, fields(user = %user_id))]
    pub async fn update_user_recommendation(
        &self,
        user_id: UserId,
        update: RecommendationUpdate,
    ) -> Result<Recommendation> {
        let _user = self.require_user(user_id).await?;
        match self.storage.latest_recommendation_for_user(user_id).await? {
            Some(current) => {
                tracing::debug!(recommendation = %current.id, "overwriting recommendation");
                self.storage
                    .set_recommendation_item(current.id, update.item_id)
                    .await
            }
            None => {
                tracing::debug!("user has no recommendation yet, creating one");
                self.storage
                    .create_recommendation(NewRecommendation {
                        user_id,
                        item_id: update.item_id,
                    })
                    .await
            }
        }
    }

    /// Loads a user or fails with `NotFound`.
    async fn require_user(&self, user_id: UserId) -> Result<User> {
        self.storage
            .user(user_id)
            .await?
            .ok_or_else(|| BffError::NotFound("User not found".to_owned()))
    }

    /// Picks the token for catalog listings: the merchant's stored token if
    /// one resolves, otherwise the static one.
    async fn listing_token(&self, merchant_id: &CloverMerchantId) -> Result<SecretString> {
        match resolve_token(&self.storage, merchant_id).await {
            Ok(token) => Ok(token),
            Err(BffError::NotFound(reason)) => {
                tracing::debug!(%reason, "falling back to the configured access token");
                self.fallback_token
                    .as_ref()
                    .map(|token| SecretString::from(token.expose_secret().to_owned()))
                    .ok_or_else(|| {
                        BffError::Unconfigured("Clover access token not configured.".to_owned())
                    })
            }
            Err(err) => Err(err),
        }
    }
}
