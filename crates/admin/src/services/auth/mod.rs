//! Admin authentication service.
//!
//! Admins are ordinary profiles with role `admin`; they sign in with the
//! same email and password as on the storefront.

mod error;

pub use error::AdminAuthError;

use sqlx::PgPool;

use soko_backend::db::ProfileRepository;
use soko_backend::models::Profile;
use soko_backend::passwords;
use soko_core::{Email, UserId, UserRole};

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    profiles: ProfileRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Check the password, then the role.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AdminAuthError::NotAdmin` if the account is not an admin.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, AdminAuthError> {
        let email = Email::parse(email)?;

        let (profile, password_hash) = self
            .profiles
            .get_with_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        passwords::verify(password, &password_hash)?;
        ensure_admin(&profile)?;

        tracing::info!(user_id = %profile.id, "Admin logged in");
        Ok(profile)
    }

    /// Load a profile and confirm it still has the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the profile is gone.
    /// Returns `AdminAuthError::NotAdmin` if it was demoted.
    pub async fn current_admin(&self, id: UserId) -> Result<Profile, AdminAuthError> {
        let profile = self
            .profiles
            .get_by_id(id)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;
        ensure_admin(&profile)?;
        Ok(profile)
    }
}

fn ensure_admin(profile: &Profile) -> Result<(), AdminAuthError> {
    if profile.role == UserRole::Admin {
        Ok(())
    } else {
        tracing::warn!(user_id = %profile.id, "Non-admin refused");
        Err(AdminAuthError::NotAdmin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use soko_backend::passwords::PasswordError;
    use uuid::Uuid;

    use super::*;

    fn profile(role: UserRole) -> Profile {
        Profile {
            id: UserId::new(Uuid::from_u128(7)),
            email: Email::parse("wanjiru@soko.test").unwrap(),
            first_name: Some("Wanjiru".to_string()),
            last_name: None,
            phone: None,
            avatar_url: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_admins_pass() {
        assert!(ensure_admin(&profile(UserRole::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&profile(UserRole::Customer)),
            Err(AdminAuthError::NotAdmin)
        ));
    }

    #[test]
    fn test_password_mismatch_is_invalid_credentials() {
        assert!(matches!(
            AdminAuthError::from(PasswordError::Mismatch),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            AdminAuthError::from(PasswordError::Hash),
            AdminAuthError::PasswordHash
        ));
    }
}
