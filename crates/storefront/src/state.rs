//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use soko_backend::{FileStore, TrackingFeed};

use crate::config::StorefrontConfig;
use crate::services::catalog::CatalogCache;
use crate::services::email::EmailService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    feed: TrackingFeed,
    files: FileStore,
    catalog: CatalogCache,
    mailer: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `feed` - Tracking change feed (spawned or detached)
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, feed: TrackingFeed) -> Self {
        let files = FileStore::new(config.upload_dir.clone(), &config.base_url);
        let catalog = CatalogCache::new(config.catalog_cache_ttl);
        let mailer = config
            .email
            .as_ref()
            .and_then(|email| match EmailService::new(email) {
                Ok(mailer) => Some(mailer),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to set up SMTP, emails will be logged");
                    None
                }
            });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                feed,
                files,
                catalog,
                mailer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Tracking change feed.
    #[must_use]
    pub fn feed(&self) -> &TrackingFeed {
        &self.inner.feed
    }

    /// Upload storage.
    #[must_use]
    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }

    /// Cached category and brand lists.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    /// SMTP mailer, when configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&EmailService> {
        self.inner.mailer.as_ref()
    }
}
