//! Cached catalog lookups.
//!
//! Category and brand lists change rarely and are read on every page, so
//! they are kept in a `moka` cache for `CATALOG_CACHE_TTL_SECS`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use soko_backend::RepositoryError;
use soko_backend::db::{BrandRepository, CategoryRepository};
use soko_backend::models::{Brand, Category};

/// Cache key for catalog lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    Brands,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Brands(Arc<Vec<Brand>>),
}

/// TTL cache over the category and brand repositories.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();
        Self { cache }
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list is not cached and the query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(pool).list().await?);
        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// All brands, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list is not cached and the query fails.
    pub async fn brands(&self, pool: &PgPool) -> Result<Arc<Vec<Brand>>, RepositoryError> {
        if let Some(CacheValue::Brands(brands)) = self.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands = Arc::new(BrandRepository::new(pool).list().await?);
        self.cache
            .insert(CacheKey::Brands, CacheValue::Brands(Arc::clone(&brands)))
            .await;
        Ok(brands)
    }

    /// Drop every cached list.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(50))
            .connect_lazy("postgres://soko@127.0.0.1:1/soko")
            .unwrap()
    }

    #[tokio::test]
    async fn test_cached_lists_skip_the_database() {
        let catalog = CatalogCache::new(Duration::from_secs(60));
        catalog
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(Arc::new(Vec::new())))
            .await;

        let brands = catalog.brands(&lazy_pool()).await.unwrap();
        assert!(brands.is_empty());
    }

    #[tokio::test]
    async fn test_miss_after_invalidate_hits_the_database() {
        let catalog = CatalogCache::new(Duration::from_secs(60));
        catalog
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::new(Vec::new())),
            )
            .await;
        catalog.invalidate_all().await;

        assert!(matches!(
            catalog.categories(&lazy_pool()).await,
            Err(RepositoryError::Database(_))
        ));
    }
}
