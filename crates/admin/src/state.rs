//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use soko_backend::FileStore;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    files: FileStore,
}

impl AppState {
    /// Create a new application state. Uploads are written under
    /// `config.upload_dir` and addressed from `config.upload_public_base_url`.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let files = FileStore::new(config.upload_dir.clone(), &config.upload_public_base_url);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                files,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Upload storage.
    #[must_use]
    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }
}
