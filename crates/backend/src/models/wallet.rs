//! Wallet balances and their transaction ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use soko_core::{UserId, WalletId, WalletTransactionId, WalletTransactionKind, WalletTransactionStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub balance: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: WalletTransactionId,
    pub wallet_id: WalletId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub status: WalletTransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
