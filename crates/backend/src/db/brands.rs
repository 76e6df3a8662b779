//! Brand repository.

use sqlx::PgPool;

use soko_core::BrandId;

use super::RepositoryError;
use crate::models::{Brand, BrandInput};

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List brands ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(
            "SELECT id, name, description, logo_url, created_at, updated_at \
             FROM shop.brands ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(brands)
    }

    /// Get a brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, description, logo_url, created_at, updated_at \
             FROM shop.brands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(brand)
    }

    /// Insert a brand, or refresh an existing brand with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(&self, input: &BrandInput) -> Result<Brand, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            r"
            INSERT INTO shop.brands (name, description, logo_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
                SET description = EXCLUDED.description, logo_url = EXCLUDED.logo_url
            RETURNING id, name, description, logo_url, created_at, updated_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.logo_url.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(brand)
    }

    /// Insert a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, input: &BrandInput) -> Result<Brand, RepositoryError> {
        sqlx::query_as::<_, Brand>(
            r"
            INSERT INTO shop.brands (name, description, logo_url)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, logo_url, created_at, updated_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.logo_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "brand name already exists"))
    }

    /// Replace a brand's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist.
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn update(&self, id: BrandId, input: &BrandInput) -> Result<Brand, RepositoryError> {
        sqlx::query_as::<_, Brand>(
            r"
            UPDATE shop.brands SET name = $2, description = $3, logo_url = $4
            WHERE id = $1
            RETURNING id, name, description, logo_url, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.logo_url.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "brand name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a brand. Its products keep existing without a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist.
    pub async fn delete(&self, id: BrandId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.brands WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
