//! Wallet route handlers.

use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use soko_backend::db::{WalletError, WalletRepository};
use soko_backend::models::{Wallet, WalletTransaction};

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Payment method recorded when the client does not name one.
const DEFAULT_TOP_UP_METHOD: &str = "mpesa";

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

impl TopUpRequest {
    fn payment_method(&self) -> &str {
        self.payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_TOP_UP_METHOD)
    }
}

#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
}

/// `GET /api/wallet`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Wallet>> {
    let wallet = WalletRepository::new(state.pool())
        .get_for_user(user.id)
        .await?
        .ok_or(AppError::Wallet(WalletError::NotFound))?;
    Ok(Json(wallet))
}

/// `GET /api/wallet/transactions`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn transactions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WalletTransaction>>> {
    let transactions = WalletRepository::new(state.pool())
        .transactions(user.id)
        .await?;
    Ok(Json(transactions))
}

/// `POST /api/wallet/top-up`
#[instrument(skip(state, user, request), fields(user_id = %user.id, amount = %request.amount))]
pub async fn top_up(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>> {
    let (wallet, transaction) = WalletRepository::new(state.pool())
        .top_up(
            user.id,
            request.amount,
            request.payment_method(),
            request.payment_reference.as_deref(),
        )
        .await?;
    tracing::info!(balance = %wallet.balance, "Wallet topped up");
    Ok(Json(TopUpResponse {
        wallet,
        transaction,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_top_up_defaults_to_mpesa() {
        let request: TopUpRequest =
            serde_json::from_value(serde_json::json!({ "amount": "500" })).unwrap();
        assert_eq!(request.payment_method(), "mpesa");
        assert_eq!(request.amount, Decimal::new(500, 0));

        let request: TopUpRequest = serde_json::from_value(
            serde_json::json!({ "amount": "500", "payment_method": "card" }),
        )
        .unwrap();
        assert_eq!(request.payment_method(), "card");
    }
}
