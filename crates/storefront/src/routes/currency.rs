//! Display currency preference.
//!
//! Prices are always stored in KES. The preferred display currency lives in
//! the session and defaults to KES.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use soko_core::{Currency, CurrencyInfo};

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::models::keys;

#[derive(Debug, Deserialize)]
pub struct SetCurrencyRequest {
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub currency: CurrencyInfo,
}

/// The session's display currency.
pub async fn preferred_currency(session: &Session) -> Currency {
    session
        .get::<Currency>(keys::PREFERRED_CURRENCY)
        .await
        .ok()
        .flatten()
        .unwrap_or(Currency::BASE)
}

/// `GET /api/currencies`
pub async fn list() -> Json<Vec<CurrencyInfo>> {
    Json(Currency::ALL.into_iter().map(Currency::info).collect())
}

/// `GET /api/currency`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CurrencyResponse> {
    Json(CurrencyResponse {
        currency: preferred_currency(&session).await.info(),
    })
}

/// `PUT /api/currency`
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<SetCurrencyRequest>,
) -> Result<Json<CurrencyResponse>> {
    let currency: Currency = request
        .currency
        .parse()
        .map_err(|e: soko_core::CurrencyError| AppError::BadRequest(e.to_string()))?;
    session
        .insert(keys::PREFERRED_CURRENCY, currency)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    tracing::debug!(%currency, "Preferred currency set");
    Ok(Json(CurrencyResponse {
        currency: currency.info(),
    }))
}
