//! Session middleware configuration for admin.
//!
//! Shares the `shop.session` table with the storefront under its own cookie,
//! with `SameSite=Strict` and a 24 hour inactivity expiry.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "soko_admin_session";

/// Session expiry time in seconds (24 hours, stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// The session store rejected the configured schema or table name.
#[derive(Debug, Error)]
#[error("invalid session store name: {0}")]
pub struct SessionStoreError(String);

/// Apply the admin cookie settings to a session store.
#[must_use]
pub fn session_layer<S>(store: S, config: &AdminConfig) -> SessionManagerLayer<S>
where
    S: tower_sessions::SessionStore,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns `SessionStoreError` if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionStoreError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("shop")
        .and_then(|store| store.with_table_name("session"))
        .map_err(SessionStoreError)?;
    Ok(session_layer(store, config))
}
