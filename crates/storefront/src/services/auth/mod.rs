//! Authentication service.
//!
//! Email and password accounts backed by `shop.profiles`.

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use soko_backend::RepositoryError;
use soko_backend::db::{PasswordResetRepository, ProfileRepository};
use soko_backend::models::Profile;
use soko_backend::passwords;
use soko_core::{Email, UserId, UserRole};

/// Registration form fields.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Authentication service.
///
/// Handles customer registration, login, and password changes.
pub struct AuthService<'a> {
    profiles: ProfileRepository<'a>,
    resets: PasswordResetRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
            resets: PasswordResetRepository::new(pool),
        }
    }

    /// Register a customer. The wallet is created alongside the profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: Registration<'_>) -> Result<Profile, AuthError> {
        let email = Email::parse(form.email)?;
        passwords::validate(form.password)?;
        let password_hash = passwords::hash(form.password)?;

        let profile = self
            .profiles
            .create_with_password(
                &email,
                &password_hash,
                non_blank(form.first_name),
                non_blank(form.last_name),
                UserRole::Customer,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %profile.id, "Customer registered");
        Ok(profile)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, AuthError> {
        let email = Email::parse(email)?;

        let (profile, password_hash) = self
            .profiles
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        passwords::verify(password, &password_hash)?;

        Ok(profile)
    }

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `current` is wrong.
    /// Returns `AuthError::WeakPassword` if `new` doesn't meet requirements.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let stored = self.profiles.password_hash(user_id).await?;
        passwords::verify(current, &stored)?;
        passwords::validate(new)?;
        let password_hash = passwords::hash(new)?;
        self.profiles.set_password_hash(user_id, &password_hash).await?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Issue a reset token for the account with this email.
    ///
    /// Returns `None` for unknown emails so callers can answer identically
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(Profile, String)>, AuthError> {
        let email = Email::parse(email)?;
        let Some(profile) = self.profiles.get_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(None);
        };
        let token = self.resets.issue(profile.id).await?;
        Ok(Some((profile, token)))
    }

    /// Set a new password using an emailed reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if `new` doesn't meet requirements.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown, expired,
    /// or already used.
    pub async fn reset_password(&self, token: &str, new: &str) -> Result<UserId, AuthError> {
        passwords::validate(new)?;
        let password_hash = passwords::hash(new)?;
        self.resets
            .consume(token.trim(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::InvalidResetToken,
                other => AuthError::Repository(other),
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_errors_map_to_auth_errors() {
        assert!(matches!(
            AuthError::from(passwords::PasswordError::TooShort),
            AuthError::WeakPassword(msg) if msg.contains("at least 8")
        ));
        assert!(matches!(
            AuthError::from(passwords::PasswordError::Mismatch),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Wanjiru ")), Some("Wanjiru"));
        assert_eq!(non_blank(None), None);
    }
}
