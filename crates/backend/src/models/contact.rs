//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use soko_core::ContactSubmissionId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactSubmission {
    pub id: ContactSubmissionId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    /// Subject the visitor picked from the service list.
    pub service: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Missing fields deserialize as empty and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub company: Option<String>,
    pub service: Option<String>,
    #[serde(default)]
    pub message: String,
}
