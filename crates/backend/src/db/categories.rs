//! Category repository.

use sqlx::PgPool;

use soko_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, image_url, parent_id, created_at, updated_at \
             FROM shop.categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, image_url, parent_id, created_at, updated_at \
             FROM shop.categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Insert a category, or update the description and image of an existing
    /// category with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the parent does not exist.
    pub async fn upsert_by_name(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.categories (name, description, image_url, parent_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
                SET description = EXCLUDED.description, image_url = EXCLUDED.image_url
            RETURNING id, name, description, image_url, parent_id, created_at, updated_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "parent category not found"))
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.categories (name, description, image_url, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, image_url, parent_id, created_at, updated_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category name already exists"))
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        if input.parent_id == Some(id) {
            return Err(RepositoryError::Conflict(
                "a category cannot be its own parent".to_owned(),
            ));
        }
        sqlx::query_as::<_, Category>(
            r"
            UPDATE shop.categories
            SET name = $2, description = $3, image_url = $4, parent_id = $5
            WHERE id = $1
            RETURNING id, name, description, image_url, parent_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.parent_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Products in it become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
