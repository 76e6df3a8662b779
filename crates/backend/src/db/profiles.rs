//! Profile repository: accounts, credentials, and roles.

use sqlx::PgPool;

use soko_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{Profile, ProfileUpdate};

const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, phone, avatar_url, role, created_at, updated_at";

/// Refusal message when a role change would leave no admin.
pub const LAST_ADMIN_MESSAGE: &str = "At least one admin is required";

/// Whether demoting `demoted` leaves at least one of `admins` in place.
fn keeps_an_admin(admins: &[UserId], demoted: UserId) -> bool {
    !admins.contains(&demoted) || admins.len() > 1
}

#[derive(sqlx::FromRow)]
struct ProfileWithHash {
    #[sqlx(flatten)]
    profile: Profile,
    password_hash: String,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a profile and its empty KES wallet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: UserRole,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.profiles (email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(first_name)
            .bind(last_name)
            .bind(role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "email already exists"))?;

        sqlx::query("INSERT INTO shop.wallets (user_id) VALUES ($1)")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(profile)
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM shop.profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(profile)
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM shop.profiles WHERE email = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(profile)
    }

    /// Get a profile and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Profile, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS}, password_hash FROM shop.profiles WHERE email = $1"
        );
        let row = sqlx::query_as::<_, ProfileWithHash>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|r| (r.profile, r.password_hash)))
    }

    /// Get the password hash for a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM shop.profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.profiles SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update name and phone. Omitted fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn update(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "UPDATE shop.profiles SET \
                 first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 phone = COALESCE($4, phone) \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(update.first_name.as_deref())
            .bind(update.last_name.as_deref())
            .bind(update.phone.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Point the profile at a newly uploaded avatar.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn set_avatar_url(&self, id: UserId, url: &str) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "UPDATE shop.profiles SET avatar_url = $2 WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// List every profile, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM shop.profiles ORDER BY created_at DESC");
        let profiles = sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(profiles)
    }

    /// Change a profile's role.
    ///
    /// Admin rows stay locked until the change commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    /// Returns `RepositoryError::Conflict` if this would demote the last admin.
    pub async fn update_role(&self, id: UserId, role: UserRole) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if role != UserRole::Admin {
            let admins = sqlx::query_scalar::<_, UserId>(
                "SELECT id FROM shop.profiles WHERE role = $1 ORDER BY id FOR UPDATE",
            )
            .bind(UserRole::Admin)
            .fetch_all(&mut *tx)
            .await?;
            if !keeps_an_admin(&admins, id) {
                return Err(RepositoryError::Conflict(LAST_ADMIN_MESSAGE.to_string()));
            }
        }

        let sql = format!(
            "UPDATE shop.profiles SET role = $2 WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(profile)
    }

    /// Change a profile's role by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this email.
    pub async fn update_role_by_email(
        &self,
        email: &Email,
        role: UserRole,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "UPDATE shop.profiles SET role = $2 WHERE email = $1 RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .bind(role)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
