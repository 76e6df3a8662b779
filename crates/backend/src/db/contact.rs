//! Contact form inbox.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{ContactSubmission, NewContactSubmission};

/// Repository for contact form submissions.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        let row = sqlx::query_as::<_, ContactSubmission>(
            r"
            INSERT INTO shop.contact_submissions (name, email, company, service, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, company, service, message, created_at
            ",
        )
        .bind(submission.name.trim())
        .bind(submission.email.trim())
        .bind(submission.company.as_deref())
        .bind(submission.service.as_deref())
        .bind(submission.message.trim())
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Every submission, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactSubmission>(
            "SELECT id, name, email, company, service, message, created_at \
             FROM shop.contact_submissions ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
