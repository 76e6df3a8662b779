//! Cart repository.

use sqlx::PgPool;

use soko_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartLine, MAX_LINE_QUANTITY};

/// Repository for a user's cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List cart lines joined with product data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT c.id, c.product_id, p.name, p.price,
                   COALESCE(p.images[1], '/placeholder.svg') AS image,
                   c.quantity, p.stock_quantity
            FROM shop.cart c
            JOIN shop.products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// Add a product, incrementing the quantity if it is already in the cart.
    /// The line never grows past [`MAX_LINE_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or inactive.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shop.cart (user_id, product_id, quantity)
            SELECT $1, p.id, $3 FROM shop.products p
            WHERE p.id = $2 AND p.is_active = TRUE
            ON CONFLICT (user_id, product_id)
                DO UPDATE SET quantity = LEAST(shop.cart.quantity::BIGINT + EXCLUDED.quantity, $4)::INTEGER
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.min(MAX_LINE_QUANTITY))
        .bind(i64::from(MAX_LINE_QUANTITY))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set a line's quantity, capped at [`MAX_LINE_QUANTITY`]. A quantity of
    /// zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the user.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity <= 0 {
            return self.remove(user_id, line_id).await;
        }
        let result = sqlx::query("UPDATE shop.cart SET quantity = $3 WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(line_id)
            .bind(quantity.min(MAX_LINE_QUANTITY))
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the user.
    pub async fn remove(&self, user_id: UserId, line_id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(line_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Total units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM shop.cart WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
