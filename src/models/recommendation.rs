//! Users and their recommended items.

use serde::{Deserialize, Serialize};

use super::{ItemId, RecommendationId, UserId};

/// An end user of the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Local primary key.
    pub id: UserId,
    /// Display name.
    pub name: String,
}

/// A Clover item recommended to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Local primary key.
    pub id: RecommendationId,
    /// Recommended-to user.
    pub user_id: UserId,
    /// Clover item id.
    pub item_id: ItemId,
}

/// Body of `POST /recommendations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecommendation {
    /// Recommended-to user.
    pub user_id: UserId,
    /// Clover item id.
    pub item_id: ItemId,
}

/// Body of `PUT /recommendations/{user_id}/recommendations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationUpdate {
    /// New Clover item id.
    pub item_id: ItemId,
}
