//! Order repository: checkout and order history.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use soko_core::pricing::order_number;
use soko_core::{
    OrderId, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus, ProductId, UserId,
    WalletTransactionKind, WalletTransactionStatus,
};

use super::{RepositoryError, TrackingRepository};
use crate::models::{NewOrder, Order, OrderDetail, OrderItem, OrderSummary};

const ORDER_COLUMNS: &str = "\
    o.id, o.user_id, o.order_number, o.status, o.payment_status, o.payment_method, \
    o.payment_reference, o.subtotal, o.tax_amount, o.shipping_amount, o.discount_amount, \
    o.total_amount, o.billing_address, o.shipping_address, o.notes, o.created_at, o.updated_at";

/// Message recorded on the first tracking entry of every order.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully";

/// Largest amount the `NUMERIC(12, 2)` money columns hold.
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Reasons checkout can refuse to create an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("{0} is no longer available")]
    ProductUnavailable(String),

    #[error("only {available} of {product} left in stock")]
    InsufficientStock { product: String, available: i32 },

    #[error("insufficient wallet balance")]
    InsufficientBalance,

    #[error("order total exceeds the maximum of KSh {}", MAX_MONEY)]
    TotalTooLarge,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// A cart line with its product row locked for the checkout transaction.
#[derive(sqlx::FromRow)]
struct LockedLine {
    product_id: ProductId,
    quantity: i32,
    name: String,
    price: Decimal,
    stock_quantity: i32,
    is_active: bool,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order.
    ///
    /// Runs in one transaction: product rows are locked, stock is decremented,
    /// the wallet is debited for wallet payments, the first tracking entry is
    /// recorded, and the cart is emptied.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::EmptyCart` if there is nothing to order.
    /// Returns `PlaceOrderError::ProductUnavailable` or `InsufficientStock` if a line cannot be filled.
    /// Returns `PlaceOrderError::InsufficientBalance` if the wallet cannot cover the total.
    /// Returns `PlaceOrderError::TotalTooLarge` if an amount does not fit [`MAX_MONEY`].
    pub async fn place(&self, new_order: &NewOrder) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, LockedLine>(
            r"
            SELECT c.product_id, c.quantity, p.name, p.price, p.stock_quantity, p.is_active
            FROM shop.cart c
            JOIN shop.products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY p.id
            FOR UPDATE OF p
            ",
        )
        .bind(new_order.user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }
        for line in &lines {
            if !line.is_active {
                return Err(PlaceOrderError::ProductUnavailable(line.name.clone()));
            }
            if line.stock_quantity < line.quantity {
                return Err(PlaceOrderError::InsufficientStock {
                    product: line.name.clone(),
                    available: line.stock_quantity,
                });
            }
        }

        let totals = OrderTotals::compute(
            lines.iter().map(|l| (l.price, l.quantity)),
            &new_order.pricing,
            new_order.discount,
        );
        check_totals(&totals)?;

        let sequence = sqlx::query_scalar::<_, i64>("SELECT nextval('shop.order_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let number = order_number(Utc::now().date_naive(), sequence);

        let order = insert_order(&mut tx, new_order, &number, &totals).await?;

        for line in &lines {
            sqlx::query(
                r"
                INSERT INTO shop.order_items
                    (order_id, product_id, product_name, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.price)
            .bind(line.price * Decimal::from(line.quantity))
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE shop.products SET stock_quantity = stock_quantity - $2 WHERE id = $1",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        if new_order.payment_method == PaymentMethod::Wallet {
            debit_wallet(&mut tx, new_order.user_id, totals.total, &number).await?;
        }

        sqlx::query(
            "INSERT INTO shop.order_tracking (order_id, status, status_message) VALUES ($1, $2, $3)",
        )
        .bind(order.id)
        .bind(OrderStatus::OrderPlaced)
        .bind(ORDER_PLACED_MESSAGE)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM shop.cart WHERE user_id = $1")
            .bind(new_order.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "Order placed"
        );

        Ok(order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders o WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// Get an order only if it belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders o WHERE o.id = $1 AND o.user_id = $2"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Get any order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders o WHERE o.id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, total_price
            FROM shop.order_items WHERE order_id = $1 ORDER BY created_at, id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Line items of several orders at once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let ids: Vec<Uuid> = order_ids.iter().map(OrderId::as_uuid).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, total_price
            FROM shop.order_items WHERE order_id = ANY($1) ORDER BY created_at, id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// List every order with its customer, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS},
                   p.email AS customer_email,
                   NULLIF(TRIM(CONCAT_WS(' ', p.first_name, p.last_name)), '') AS customer_name,
                   (SELECT COUNT(*) FROM shop.order_items i WHERE i.order_id = o.id) AS item_count
            FROM shop.orders o
            JOIN shop.profiles p ON p.id = o.user_id
            WHERE $1::shop.order_status IS NULL OR o.status = $1
            ORDER BY o.created_at DESC
            "
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// An order with its items and tracking history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn detail(&self, order: Order) -> Result<OrderDetail, RepositoryError> {
        let items = self.items(order.id).await?;
        let tracking = TrackingRepository::new(self.pool)
            .list_for_order(order.id)
            .await?;
        Ok(OrderDetail {
            order,
            items,
            tracking,
        })
    }

    /// Set an order's payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.orders SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    new_order: &NewOrder,
    number: &str,
    totals: &OrderTotals,
) -> Result<Order, sqlx::Error> {
    let sql = format!(
        r"
        INSERT INTO shop.orders AS o (
            user_id, order_number, status, payment_status, payment_method, payment_reference,
            subtotal, tax_amount, shipping_amount, discount_amount, total_amount,
            billing_address, shipping_address, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {ORDER_COLUMNS}
        "
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(new_order.user_id)
        .bind(number)
        .bind(OrderStatus::OrderPlaced)
        .bind(new_order.payment_method.initial_payment_status())
        .bind(new_order.payment_method)
        .bind(new_order.payment_reference.as_deref())
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.shipping)
        .bind(totals.discount)
        .bind(totals.total)
        .bind(Json(&new_order.billing_address))
        .bind(Json(&new_order.shipping_address))
        .bind(new_order.notes.as_deref())
        .fetch_one(&mut **tx)
        .await
}

async fn debit_wallet(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    amount: Decimal,
    number: &str,
) -> Result<(), PlaceOrderError> {
    let wallet_id = sqlx::query_scalar::<_, soko_core::WalletId>(
        r"
        UPDATE shop.wallets SET balance = balance - $2
        WHERE user_id = $1 AND balance >= $2
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(PlaceOrderError::InsufficientBalance)?;

    if amount.is_zero() {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO shop.wallet_transactions
            (wallet_id, user_id, kind, amount, description, payment_method, payment_reference, status)
        VALUES ($1, $2, $3, $4, $5, 'wallet', $6, $7)
        ",
    )
    .bind(wallet_id)
    .bind(user_id)
    .bind(WalletTransactionKind::Purchase)
    .bind(amount)
    .bind(format!("Payment for order {number}"))
    .bind(number)
    .bind(WalletTransactionStatus::Completed)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Every amount written to the order row must fit its column.
fn check_totals(totals: &OrderTotals) -> Result<(), PlaceOrderError> {
    let amounts = [
        totals.subtotal,
        totals.tax,
        totals.shipping,
        totals.discount,
        totals.total,
    ];
    if amounts.iter().any(|amount| amount.abs() > MAX_MONEY) {
        return Err(PlaceOrderError::TotalTooLarge);
    }
    Ok(())
}
