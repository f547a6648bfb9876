//! Async HTTP client for the Clover API.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret as _, SecretString};
use url::{Url, form_urlencoded};

use super::{
    CATEGORIES_PATH, DEFAULT_BASE_URL, ITEM_EXPAND, ITEMS_EXPAND, ITEMS_PATH,
    MODIFIER_GROUPS_PATH,
};
use crate::error::{BffError, Result};
use crate::models::{
    CloverCategory, CloverItem, CloverMerchant, CloverMerchantId, Elements, ItemId,
    ModifierGroup, Page,
};

/// Builder for constructing a [`CloverClient`].
#[derive(Debug)]
pub struct CloverClientBuilder {
    /// Base URL override (for testing or production hosts).
    base_url: Option<String>,
}

impl CloverClientBuilder {
    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Unconfigured`] if the base URL is not a valid
    /// absolute HTTP URL, or [`BffError::Unexpected`] if the HTTP client
    /// fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<CloverClient> {
        let raw = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = Url::parse(&raw)
            .map_err(|err| BffError::Unconfigured(format!("invalid Clover base URL {raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BffError::Unconfigured(format!(
                "Clover base URL {raw} cannot carry a path"
            )));
        }
        tracing::debug!(base_url = %base_url, "building Clover client");
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| BffError::Unexpected(err.to_string()))?;

        Ok(CloverClient { http, base_url })
    }
}

/// Async client for the Clover API.
///
/// Tokens are passed per call because each merchant has its own.
/// Use [`CloverClient::builder()`] to construct an instance.
#[derive(Debug, Clone)]
pub struct CloverClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// API base URL (scheme + host, optionally a path prefix).
    base_url: Url,
}

impl CloverClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub const fn builder() -> CloverClientBuilder {
        CloverClientBuilder { base_url: None }
    }

    /// Fetches the merchant profile.
    ///
    /// # Errors
    ///
    /// Returns an error if Clover is unreachable, answers with a
    /// non-success status, or the body is not a merchant profile.
    #[inline]
    pub async fn merchant(
        &self,
        merchant_id: &CloverMerchantId,
        token: &SecretString,
    ) -> Result<CloverMerchant> {
        self.request(merchant_id, token, &[], &[]).await
    }

    /// Fetches one item with its variants expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if Clover is unreachable, answers with a
    /// non-success status, or the body is not an item.
    #[inline]
    pub async fn item(
        &self,
        merchant_id: &CloverMerchantId,
        item_id: &ItemId,
        token: &SecretString,
    ) -> Result<CloverItem> {
        let query = [("expand", ITEM_EXPAND.to_owned())];
        self.request(merchant_id, token, &[ITEMS_PATH, item_id.as_inner()], &query)
            .await
    }

    /// Fetches the merchant's categories.
    ///
    /// # Errors
    ///
    /// Returns an error if Clover is unreachable, answers with a
    /// non-success status, or the body is not a category collection.
    #[inline]
    pub async fn categories(
        &self,
        merchant_id: &CloverMerchantId,
        token: &SecretString,
        page: Page,
    ) -> Result<Vec<CloverCategory>> {
        let envelope: Elements<CloverCategory> = self
            .request(merchant_id, token, &[CATEGORIES_PATH], &page.query_pairs())
            .await?;
        Ok(envelope.elements)
    }

    /// Fetches the merchant's items with variants and categories expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if Clover is unreachable, answers with a
    /// non-success status, or the body is not an item collection.
    #[inline]
    pub async fn items(
        &self,
        merchant_id: &CloverMerchantId,
        token: &SecretString,
        page: Page,
    ) -> Result<Vec<CloverItem>> {
        let mut query = vec![("expand", ITEMS_EXPAND.to_owned())];
        query.extend(page.query_pairs());
        let envelope: Elements<CloverItem> = self
            .request(merchant_id, token, &[ITEMS_PATH], &query)
            .await?;
        Ok(envelope.elements)
    }

    /// Fetches the merchant's modifier groups.
    ///
    /// # Errors
    ///
    /// Returns an error if Clover is unreachable, answers with a
    /// non-success status, or the body is not a modifier group collection.
    #[inline]
    pub async fn modifier_groups(
        &self,
        merchant_id: &CloverMerchantId,
        token: &SecretString,
        page: Page,
    ) -> Result<Vec<ModifierGroup>> {
        let envelope: Elements<ModifierGroup> = self
            .request(
                merchant_id,
                token,
                &[MODIFIER_GROUPS_PATH],
                &page.query_pairs(),
            )
            .await?;
        Ok(envelope.elements)
    }

    /// Sends an authenticated GET to
    /// `{base}/v3/merchants/{merchant_id}/{path...}` and deserializes the
    /// response.
    ///
    /// # Errors
    ///
    /// [`BffError::ServiceUnavailable`] on network failure,
    /// [`BffError::Unauthorized`] on 401, [`BffError::Upstream`] on any
    /// other non-success status, [`BffError::Unexpected`] when the body
    /// does not match `T`.
    #[tracing::instrument(skip_all, fields(merchant = %merchant_id))]
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        merchant_id: &CloverMerchantId,
        token: &SecretString,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(merchant_id, path, query)?;
        tracing::debug!(url = %url, "sending GET request");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Builds the full request URL.
    fn endpoint(
        &self,
        merchant_id: &CloverMerchantId,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                BffError::Unconfigured("Clover base URL cannot carry a path".to_owned())
            })?;
            let _segments = segments
                .pop_if_empty()
                .extend(["v3", "merchants", merchant_id.as_inner()])
                .extend(path);
        }
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.set_query(Some(&encoded));
        }
        Ok(url)
    }

    /// Handles an HTTP response, checking status and deserializing the body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|err| BffError::malformed(&err))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(BffError::Unauthorized)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            tracing::debug!(status = status.as_u16(), body = %body, "Clover API error");
            Err(BffError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merchant() -> CloverMerchantId {
        CloverMerchantId::new("MID1".to_owned())
    }

    #[test]
    fn builder_defaults_to_sandbox() {
        let client = CloverClient::builder().build().unwrap();
        assert_eq!(client.base_url.as_str(), "https://apisandbox.dev.clover.com/");
    }

    #[test]
    fn builder_custom_base_url() {
        let client = CloverClient::builder()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();
        assert_eq!(client.base_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn builder_rejects_garbage_url() {
        let result = CloverClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(BffError::Unconfigured(_))));
    }

    #[test]
    fn builder_rejects_non_base_url() {
        let result = CloverClient::builder().base_url("mailto:ops@example.com").build();
        assert!(matches!(result, Err(BffError::Unconfigured(_))));
    }

    #[test]
    fn endpoint_for_merchant_profile() {
        let client = CloverClient::builder().build().unwrap();
        let url = client.endpoint(&merchant(), &[], &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://apisandbox.dev.clover.com/v3/merchants/MID1"
        );
    }

    #[test]
    fn endpoint_with_path_and_query() {
        let client = CloverClient::builder()
            .base_url("http://localhost:9000/proxy/")
            .build()
            .unwrap();
        let query = [("expand", ITEMS_EXPAND.to_owned()), ("limit", "5".to_owned())];
        let url = client.endpoint(&merchant(), &[ITEMS_PATH], &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/proxy/v3/merchants/MID1/items?expand=variants%2Ccategories&limit=5"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let client = CloverClient::builder().build().unwrap();
        let url = client
            .endpoint(&merchant(), &[ITEMS_PATH, "a/b"], &[])
            .unwrap();
        assert!(url.path().ends_with("/items/a%2Fb"));
    }
}
