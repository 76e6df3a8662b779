//! Account management commands.
//!
//! Accounts created here get an empty KES wallet like any signup.

use thiserror::Error;

use soko_backend::RepositoryError;
use soko_backend::db::ProfileRepository;
use soko_backend::passwords::{self, PasswordError};
use soko_core::{Email, EmailError, UserRole};

use super::DATABASE_URL;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No account with email: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

const fn role_for(admin: bool) -> UserRole {
    if admin { UserRole::Admin } else { UserRole::Customer }
}

/// Create an account with a hashed password.
///
/// # Errors
///
/// Returns `UserError` for an invalid email or password, or if the email is taken.
pub async fn create(
    email: &str,
    password: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    admin: bool,
) -> Result<(), UserError> {
    let email = Email::parse(email)?;
    passwords::validate(password)?;
    let hash = passwords::hash(password)?;

    let pool = super::connect()
        .await
        .ok_or(UserError::MissingEnvVar(DATABASE_URL))??;

    let profile = ProfileRepository::new(&pool)
        .create_with_password(&email, &hash, first_name, last_name, role_for(admin))
        .await?;

    tracing::info!(user_id = %profile.id, role = %profile.role, "Created account {}", profile.email);
    Ok(())
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Returns `UserError::NotFound` if no account has this email.
pub async fn promote(email: &str) -> Result<(), UserError> {
    let email = Email::parse(email)?;

    let pool = super::connect()
        .await
        .ok_or(UserError::MissingEnvVar(DATABASE_URL))??;

    let profile = ProfileRepository::new(&pool)
        .update_role_by_email(&email, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserError::NotFound(email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %profile.id, "Promoted {} to admin", profile.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for() {
        assert_eq!(role_for(true), UserRole::Admin);
        assert_eq!(role_for(false), UserRole::Customer);
    }

    #[test]
    fn test_error_messages() {
        let err = UserError::from(PasswordError::TooShort);
        assert_eq!(err.to_string(), "Invalid password: password must be at least 8 characters");
        assert_eq!(
            UserError::NotFound("a@example.com".into()).to_string(),
            "No account with email: a@example.com"
        );
    }
}
