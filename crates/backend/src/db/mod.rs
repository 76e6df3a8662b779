//! Database operations for the `shop` schema.
//!
//! # Tables
//!
//! - `profiles` - Accounts (customers and admins) with password hashes
//! - `password_reset_tokens` - Digests of emailed reset links
//! - `categories`, `brands`, `products` - Catalog
//! - `cart`, `wishlist` - Per-user shopping state
//! - `orders`, `order_items`, `order_tracking` - Orders and their status history
//! - `wallets`, `wallet_transactions` - Stored balances and their ledger
//! - `contact_submissions` - Contact form inbox
//! - `settings` - Store settings (JSONB)
//! - `session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/backend/migrations/` and run via:
//! ```bash
//! cargo run -p soko-cli -- migrate
//! ```

pub mod analytics;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod orders;
pub mod password_resets;
pub mod products;
pub mod profiles;
pub mod settings;
pub mod tracking;
pub mod wallets;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::AnalyticsRepository;
pub use brands::BrandRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use contact::ContactRepository;
pub use orders::{OrderRepository, PlaceOrderError};
pub use password_resets::PasswordResetRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;
pub use settings::SettingsRepository;
pub use tracking::{StatusUpdate, TrackingRepository};
pub use wallets::{WalletError, WalletRepository};
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique or foreign-key violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_constraint(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run every pending migration in `crates/backend/migrations/`.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
