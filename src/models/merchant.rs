//! Local merchant records and their Clover access tokens.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{CloverMerchantId, MerchantId, TokenId};

/// A merchant onboarded into the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    /// Local primary key.
    pub id: MerchantId,
    /// Identifier of the same merchant at Clover.
    pub clover_merchant_id: CloverMerchantId,
    /// Business name.
    pub name: String,
}

/// Fields required to insert a [`Merchant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMerchant {
    /// Identifier of the merchant at Clover.
    pub clover_merchant_id: CloverMerchantId,
    /// Business name.
    pub name: String,
}

/// A Clover access token issued to a merchant.
///
/// Tokens are only ever appended; the most recently created one is
/// authoritative.
#[derive(Debug)]
pub struct MerchantToken {
    /// Local primary key.
    pub id: TokenId,
    /// Owning merchant.
    pub merchant_id: MerchantId,
    /// The bearer token. May be empty in legacy rows.
    pub token: SecretString,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a [`MerchantToken`].
#[derive(Debug)]
pub struct NewMerchantToken {
    /// Owning merchant.
    pub merchant_id: MerchantId,
    /// The bearer token.
    pub token: SecretString,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

/// Entry of `GET /merchants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantInfo {
    /// Clover merchant id.
    pub clover_merchant_id: CloverMerchantId,
    /// Business name as reported by Clover.
    pub name: String,
}
