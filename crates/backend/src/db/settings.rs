//! Key/value settings store.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::StoreSettings;

/// Key under which [`StoreSettings`] is stored.
pub const STORE_SETTINGS_KEY: &str = "store";

/// Repository for JSON settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read a setting by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored JSON does not match `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM shop.settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        value
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| RepositoryError::DataCorruption(format!("setting {key}: {e}")))
            })
            .transpose()
    }

    /// Write a setting, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if `value` cannot be serialized.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let json = serde_json::to_value(value)
            .map_err(|e| RepositoryError::DataCorruption(format!("setting {key}: {e}")))?;
        sqlx::query(
            r"
            INSERT INTO shop.settings (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(json)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Store settings, with defaults for anything never saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the row cannot be read or decoded.
    pub async fn load_store(&self) -> Result<StoreSettings, RepositoryError> {
        Ok(self.get(STORE_SETTINGS_KEY).await?.unwrap_or_default())
    }

    /// Save store settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn save_store(&self, settings: &StoreSettings) -> Result<(), RepositoryError> {
        self.set(STORE_SETTINGS_KEY, settings).await
    }
}
