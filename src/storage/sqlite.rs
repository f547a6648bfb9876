//! SQLite storage backend.
//!
//! Persists merchants, tokens, users and recommendations through a `sqlx`
//! connection pool. The schema lives in `migrations/` and is embedded into
//! the binary; call [`SqliteStorage::migrate`] once after connecting.
//! Token timestamps are stored as integer microseconds since the epoch so
//! that ordering happens on numbers, not on text.

use core::str::FromStr;
use std::fs;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret as _, SecretString};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{BffError, Result};
use crate::models::{
    CloverMerchantId, ItemId, Merchant, MerchantId, MerchantToken, NewMerchant, NewMerchantToken,
    NewRecommendation, Recommendation, RecommendationId, TokenId, User, UserId,
};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "clover-bff";

/// Database file name inside the data directory.
const DB_FILE: &str = "clover-bff.db";

/// Embedded schema migrations.
static MIGRATOR: Migrator = sqlx::migrate!();

/// SQLite-backed storage.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    /// Connection pool.
    pool: SqlitePool,
}

/// Row of the `merchants` table.
#[derive(Debug, sqlx::FromRow)]
struct MerchantRow {
    /// Primary key.
    id: i64,
    /// Clover merchant id.
    clover_merchant_id: String,
    /// Business name.
    name: String,
}

impl From<MerchantRow> for Merchant {
    #[inline]
    fn from(row: MerchantRow) -> Self {
        Self {
            id: MerchantId::new(row.id),
            clover_merchant_id: CloverMerchantId::new(row.clover_merchant_id),
            name: row.name,
        }
    }
}

/// Row of the `merchant_tokens` table.
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    /// Primary key.
    id: i64,
    /// Owning merchant.
    merchant_id: i64,
    /// Token text.
    token: String,
    /// Microseconds since the epoch.
    created_at: i64,
}

impl TryFrom<TokenRow> for MerchantToken {
    type Error = BffError;

    #[inline]
    fn try_from(row: TokenRow) -> Result<Self> {
        let created_at = DateTime::<Utc>::from_timestamp_micros(row.created_at).ok_or_else(|| {
            BffError::Storage(format!("token {} has invalid created_at {}", row.id, row.created_at).into())
        })?;
        Ok(Self {
            id: TokenId::new(row.id),
            merchant_id: MerchantId::new(row.merchant_id),
            token: SecretString::from(row.token),
            created_at,
        })
    }
}

/// Row of the `users` table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    /// Primary key.
    id: i64,
    /// Display name.
    name: String,
}

impl From<UserRow> for User {
    #[inline]
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
        }
    }
}

/// Row of the `recommendations` table.
#[derive(Debug, sqlx::FromRow)]
struct RecommendationRow {
    /// Primary key.
    id: i64,
    /// Recommended-to user.
    user_id: i64,
    /// Clover item id.
    item_id: String,
}

impl From<RecommendationRow> for Recommendation {
    #[inline]
    fn from(row: RecommendationRow) -> Self {
        Self {
            id: RecommendationId::new(row.id),
            user_id: UserId::new(row.user_id),
            item_id: ItemId::new(row.item_id),
        }
    }
}

impl SqliteStorage {
    /// Opens a pool for `database_url`, creating the file if needed.
    ///
    /// In-memory URLs get a single long-lived connection, since every new
    /// SQLite connection would otherwise see its own empty database.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Storage`] if the URL is invalid or the database
    /// cannot be opened.
    #[inline]
    #[tracing::instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;
        tracing::debug!(in_memory, "opened SQLite pool");
        Ok(Self { pool })
    }

    /// Opens a fresh, migrated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Storage`] if SQLite fails to open or migrate.
    #[inline]
    pub async fn in_memory() -> Result<Self> {
        let storage = Self::connect("sqlite::memory:").await?;
        storage.migrate().await?;
        Ok(storage)
    }

    /// Applies all pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Storage`] if a migration fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("database schema is up to date");
        Ok(())
    }

    /// Returns the default database URL under the user's data directory
    /// (e.g. `~/.local/share/clover-bff/clover-bff.db`), creating the
    /// directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Unconfigured`] if no data directory is known for
    /// this platform, or [`BffError::Storage`] if it cannot be created.
    #[inline]
    pub fn default_database_url() -> Result<String> {
        let dir = dirs::data_dir()
            .ok_or_else(|| {
                BffError::Unconfigured(
                    "no data directory available; set DATABASE_URL".to_owned(),
                )
            })?
            .join(APP_NAME);
        fs::create_dir_all(&dir).map_err(|err| BffError::Storage(Box::new(err)))?;
        Ok(format!("sqlite://{}", dir.join(DB_FILE).display()))
    }
}

impl super::Storage for SqliteStorage {
    async fn merchant_by_clover_id(
        &self,
        clover_merchant_id: &CloverMerchantId,
    ) -> Result<Option<Merchant>> {
        let row: Option<MerchantRow> = sqlx::query_as(
            "SELECT id, clover_merchant_id, name FROM merchants WHERE clover_merchant_id = ?",
        )
        .bind(clover_merchant_id.as_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Merchant::from))
    }

    async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant> {
        let row: MerchantRow = sqlx::query_as(
            "INSERT INTO merchants (clover_merchant_id, name) VALUES (?, ?) \
             RETURNING id, clover_merchant_id, name",
        )
        .bind(merchant.clover_merchant_id.as_inner())
        .bind(merchant.name.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn latest_token(&self, merchant_id: MerchantId) -> Result<Option<MerchantToken>> {
        let row: Option<TokenRow> = sqlx::query_as(
            "SELECT id, merchant_id, token, created_at FROM merchant_tokens \
             WHERE merchant_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(merchant_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        row.map(MerchantToken::try_from).transpose()
    }

    async fn insert_token(&self, token: NewMerchantToken) -> Result<TokenId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO merchant_tokens (merchant_id, token, created_at) VALUES (?, ?, ?) \
             RETURNING id",
        )
        .bind(token.merchant_id.into_inner())
        .bind(token.token.expose_secret())
        .bind(token.created_at.timestamp_micros())
        .fetch_one(&self.pool)
        .await?;
        Ok(TokenId::new(id))
    }

    async fn user(&self, user_id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, name FROM users WHERE id = ?")
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user(&self, name: String) -> Result<User> {
        let row: UserRow = sqlx::query_as("INSERT INTO users (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn create_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<Recommendation> {
        let row: RecommendationRow = sqlx::query_as(
            "INSERT INTO recommendations (user_id, item_id) VALUES (?, ?) \
             RETURNING id, user_id, item_id",
        )
        .bind(recommendation.user_id.into_inner())
        .bind(recommendation.item_id.into_inner())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn recommendations(&self) -> Result<Vec<Recommendation>> {
        let rows: Vec<RecommendationRow> =
            sqlx::query_as("SELECT id, user_id, item_id FROM recommendations ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    async fn recommendation(&self, id: RecommendationId) -> Result<Option<Recommendation>> {
        let row: Option<RecommendationRow> =
            sqlx::query_as("SELECT id, user_id, item_id FROM recommendations WHERE id = ?")
                .bind(id.into_inner())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Recommendation::from))
    }

    async fn latest_recommendation_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Recommendation>> {
        let row: Option<RecommendationRow> = sqlx::query_as(
            "SELECT id, user_id, item_id FROM recommendations \
             WHERE user_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Recommendation::from))
    }

    async fn set_recommendation_item(
        &self,
        id: RecommendationId,
        item_id: ItemId,
    ) -> Result<Recommendation> {
        let row: Option<RecommendationRow> = sqlx::query_as(
            "UPDATE recommendations SET item_id = ? WHERE id = ? \
             RETURNING id, user_id, item_id",
        )
        .bind(item_id.into_inner())
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Recommendation::from)
            .ok_or_else(|| BffError::NotFound(format!("Recommendation {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    async fn seeded() -> (SqliteStorage, Merchant) {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let merchant = storage
            .insert_merchant(NewMerchant {
                clover_merchant_id: CloverMerchantId::new("M1".to_owned()),
                name: "Corner Cafe".to_owned(),
            })
            .await
            .unwrap();
        (storage, merchant)
    }

    async fn add_token(storage: &SqliteStorage, merchant_id: MerchantId, token: &str, secs: i64) {
        let _id = storage
            .insert_token(NewMerchantToken {
                merchant_id,
                token: SecretString::from(token.to_owned()),
                created_at: at(secs),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn merchant_round_trip() {
        let (storage, merchant) = seeded().await;
        let found = storage
            .merchant_by_clover_id(&CloverMerchantId::new("M1".to_owned()))
            .await
            .unwrap();
        assert_eq!(found, Some(merchant));
        assert!(
            storage
                .merchant_by_clover_id(&CloverMerchantId::new("nope".to_owned()))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_clover_id_is_a_storage_error() {
        let (storage, _merchant) = seeded().await;
        let result = storage
            .insert_merchant(NewMerchant {
                clover_merchant_id: CloverMerchantId::new("M1".to_owned()),
                name: "Copy".to_owned(),
            })
            .await;
        assert!(matches!(result, Err(BffError::Storage(_))));
    }

    #[tokio::test]
    async fn latest_token_orders_by_timestamp_not_insertion() {
        let (storage, merchant) = seeded().await;
        add_token(&storage, merchant.id, "newest", 1_700_000_300).await;
        add_token(&storage, merchant.id, "oldest", 1_700_000_100).await;
        add_token(&storage, merchant.id, "middle", 1_700_000_200).await;

        let latest = storage.latest_token(merchant.id).await.unwrap().unwrap();
        assert_eq!(latest.token.expose_secret(), "newest");
        assert_eq!(latest.created_at, at(1_700_000_300));
    }

    #[tokio::test]
    async fn equal_timestamps_prefer_higher_id() {
        let (storage, merchant) = seeded().await;
        add_token(&storage, merchant.id, "first", 1_700_000_000).await;
        add_token(&storage, merchant.id, "second", 1_700_000_000).await;
        let latest = storage.latest_token(merchant.id).await.unwrap().unwrap();
        assert_eq!(latest.token.expose_secret(), "second");
    }

    #[tokio::test]
    async fn token_for_unknown_merchant_violates_foreign_key() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let result = storage
            .insert_token(NewMerchantToken {
                merchant_id: MerchantId::new(99),
                token: SecretString::from("t".to_owned()),
                created_at: at(0),
            })
            .await;
        assert!(matches!(result, Err(BffError::Storage(_))));
    }

    #[tokio::test]
    async fn recommendation_lifecycle() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = storage.insert_user("Ada".to_owned()).await.unwrap();
        let first = storage
            .create_recommendation(NewRecommendation {
                user_id: user.id,
                item_id: ItemId::new("I1".to_owned()),
            })
            .await
            .unwrap();
        let second = storage
            .create_recommendation(NewRecommendation {
                user_id: user.id,
                item_id: ItemId::new("I2".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(storage.recommendations().await.unwrap(), vec![first, second.clone()]);

        let latest = storage
            .latest_recommendation_for_user(user.id)
            .await
            .unwrap();
        assert_eq!(latest, Some(second.clone()));

        let updated = storage
            .set_recommendation_item(second.id, ItemId::new("I7".to_owned()))
            .await
            .unwrap();
        assert_eq!(updated.item_id.as_inner(), "I7");
        assert_eq!(storage.recommendation(second.id).await.unwrap(), Some(updated));
        assert_eq!(storage.recommendations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn updating_missing_recommendation_is_not_found() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let result = storage
            .set_recommendation_item(RecommendationId::new(5), ItemId::new("I1".to_owned()))
            .await;
        assert!(matches!(result, Err(BffError::NotFound(_))));
    }

    #[tokio::test]
    async fn file_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("bff.db").display());

        let storage = SqliteStorage::connect(&url).await.unwrap();
        storage.migrate().await.unwrap();
        let user = storage.insert_user("Grace".to_owned()).await.unwrap();
        drop(storage);

        let reopened = SqliteStorage::connect(&url).await.unwrap();
        reopened.migrate().await.unwrap();
        assert_eq!(reopened.user(user.id).await.unwrap(), Some(user));
    }
}
