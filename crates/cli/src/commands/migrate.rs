//! Database migration command.
//!
//! Applies `crates/backend/migrations/` in order. Already-applied
//! migrations are skipped.

use thiserror::Error;

use super::DATABASE_URL;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect()
        .await
        .ok_or(MigrationError::MissingEnvVar(DATABASE_URL))??;

    tracing::info!("Running migrations...");
    soko_backend::db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
