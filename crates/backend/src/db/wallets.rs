//! Wallet repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use soko_core::{UserId, WalletTransactionKind, WalletTransactionStatus};

use super::RepositoryError;
use crate::models::{Wallet, WalletTransaction};

/// Smallest top-up accepted, in KES.
pub const MIN_TOP_UP: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Largest single top-up accepted, in KES.
pub const MAX_TOP_UP: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Errors from wallet mutations.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("minimum top-up amount is KSh 100")]
    BelowMinimum,

    #[error("maximum top-up amount is KSh 100,000")]
    AboveMaximum,

    #[error("wallet not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for WalletError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

const WALLET_COLUMNS: &str = "id, user_id, balance, currency, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, wallet_id, user_id, kind, amount, description, \
    payment_method, payment_reference, status, created_at, updated_at";

/// Repository for wallets and their ledger.
pub struct WalletRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WalletRepository<'a> {
    /// Create a new wallet repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's wallet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(&self, user_id: UserId) -> Result<Option<Wallet>, RepositoryError> {
        let sql = format!("SELECT {WALLET_COLUMNS} FROM shop.wallets WHERE user_id = $1");
        let wallet = sqlx::query_as::<_, Wallet>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(wallet)
    }

    /// The user's wallet transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WalletTransaction>, RepositoryError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM shop.wallet_transactions \
             WHERE user_id = $1 ORDER BY created_at DESC, id"
        );
        let transactions = sqlx::query_as::<_, WalletTransaction>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(transactions)
    }

    /// Credit the wallet and record a completed deposit.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::BelowMinimum` for amounts under [`MIN_TOP_UP`]
    /// and `WalletError::AboveMaximum` for amounts over [`MAX_TOP_UP`].
    /// Returns `WalletError::NotFound` if the user has no wallet.
    pub async fn top_up(
        &self,
        user_id: UserId,
        amount: Decimal,
        payment_method: &str,
        payment_reference: Option<&str>,
    ) -> Result<(Wallet, WalletTransaction), WalletError> {
        check_top_up(amount)?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE shop.wallets SET balance = balance + $2 WHERE user_id = $1 \
             RETURNING {WALLET_COLUMNS}"
        );
        let wallet = sqlx::query_as::<_, Wallet>(&sql)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WalletError::NotFound)?;

        let sql = format!(
            r"
            INSERT INTO shop.wallet_transactions
                (wallet_id, user_id, kind, amount, description, payment_method, payment_reference, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TRANSACTION_COLUMNS}
            "
        );
        let transaction = sqlx::query_as::<_, WalletTransaction>(&sql)
            .bind(wallet.id)
            .bind(user_id)
            .bind(WalletTransactionKind::Deposit)
            .bind(amount)
            .bind("Wallet top-up")
            .bind(payment_method)
            .bind(payment_reference)
            .bind(WalletTransactionStatus::Completed)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, amount = %amount, "Wallet topped up");

        Ok((wallet, transaction))
    }
}

/// Range check applied before any top-up touches the database.
///
/// # Errors
///
/// Returns `WalletError::BelowMinimum` or `WalletError::AboveMaximum`.
pub fn check_top_up(amount: Decimal) -> Result<(), WalletError> {
    if amount < MIN_TOP_UP {
        return Err(WalletError::BelowMinimum);
    }
    if amount > MAX_TOP_UP {
        return Err(WalletError::AboveMaximum);
    }
    Ok(())
}
