//! Contact form handler.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use soko_backend::db::ContactRepository;
use soko_backend::models::{ContactSubmission, NewContactSubmission};
use soko_core::Email;

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::state::AppState;

fn validate(submission: &NewContactSubmission) -> Result<()> {
    for (field, value) in [
        ("Name", &submission.name),
        ("Email", &submission.email),
        ("Message", &submission.message),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }
    Email::parse(submission.email.trim())
        .map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;
    Ok(())
}

/// `POST /api/contact`
#[instrument(skip(state, submission))]
pub async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<NewContactSubmission>,
) -> Result<(StatusCode, Json<ContactSubmission>)> {
    validate(&submission)?;
    let saved = ContactRepository::new(state.pool())
        .create(&submission)
        .await?;
    tracing::info!(submission_id = %saved.id, "Contact form submitted");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn submission() -> NewContactSubmission {
        NewContactSubmission {
            name: "Baraka".to_string(),
            email: "baraka@soko.test".to_string(),
            company: None,
            service: Some("wholesale".to_string()),
            message: "Do you ship to Kisumu?".to_string(),
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(validate(&submission()).is_ok());
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let mut form = submission();
        form.message = "   ".to_string();
        let err = validate(&form).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Message is required");
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut form = submission();
        form.email = "baraka-at-soko".to_string();
        assert!(validate(&form).is_err());
    }
}
