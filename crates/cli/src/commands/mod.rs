//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

pub const DATABASE_URL: &str = "DATABASE_URL";

/// Connect using `DATABASE_URL` from the environment or `.env`.
///
/// Returns `None` if the variable is unset.
async fn connect() -> Option<Result<PgPool, sqlx::Error>> {
    dotenvy::dotenv().ok();

    let url = SecretString::from(std::env::var(DATABASE_URL).ok()?);
    tracing::info!("Connecting to database...");
    Some(soko_backend::db::create_pool(&url).await)
}
