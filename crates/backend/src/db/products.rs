//! Product repository.

use sqlx::{PgPool, Postgres, QueryBuilder};

use soko_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_SELECT: &str = "\
    SELECT p.id, p.name, p.description, p.short_description, p.price, p.original_price, \
           p.sku, p.stock_quantity, p.category_id, c.name AS category_name, \
           p.brand_id, b.name AS brand_name, p.images, p.features, p.specifications, \
           p.is_active, p.is_featured, p.weight, p.dimensions, p.created_at, p.updated_at \
    FROM shop.products p \
    LEFT JOIN shop.categories c ON c.id = p.category_id \
    LEFT JOIN shop.brands b ON b.id = p.brand_id";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        query.push(" WHERE p.is_active = TRUE");
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY p.created_at DESC LIMIT ")
            .push_bind(filter.limit())
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// List every product regardless of state, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.created_at DESC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Get an active product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1 AND p.is_active = TRUE");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Get a product regardless of state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Find a product by exact name (used by the catalog seeder).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_id_by_name(&self, name: &str) -> Result<Option<ProductId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            "SELECT id FROM shop.products WHERE name = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        Ok(id)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate SKU or unknown category/brand.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO shop.products (
                name, description, short_description, price, original_price, sku,
                stock_quantity, category_id, brand_id, images, features, specifications,
                is_active, is_featured, weight, dimensions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.short_description.as_deref())
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.sku.as_deref())
        .bind(input.stock_quantity)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.images)
        .bind(&input.features)
        .bind(&input.specifications)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.weight)
        .bind(input.dimensions.as_ref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "sku already exists or category/brand unknown"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` for a duplicate SKU or unknown category/brand.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.products SET
                name = $2, description = $3, short_description = $4, price = $5,
                original_price = $6, sku = $7, stock_quantity = $8, category_id = $9,
                brand_id = $10, images = $11, features = $12, specifications = $13,
                is_active = $14, is_featured = $15, weight = $16, dimensions = $17
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.short_description.as_deref())
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.sku.as_deref())
        .bind(input.stock_quantity)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.images)
        .bind(&input.features)
        .bind(&input.specifications)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.weight)
        .bind(input.dimensions.as_ref())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "sku already exists or category/brand unknown"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Past order items keep their name snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(category) = filter.category_name() {
        query
            .push(" AND c.name = ")
            .push_bind(category.to_owned());
    }
    if let Some(brand) = filter.brand_name() {
        query.push(" AND b.name = ").push_bind(brand.to_owned());
    }
    if let Some(featured) = filter.featured {
        query.push(" AND p.is_featured = ").push_bind(featured);
    }
    if let Some(pattern) = filter.search_pattern() {
        query
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.short_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
