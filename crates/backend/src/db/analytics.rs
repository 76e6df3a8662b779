//! Dashboard aggregates.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{DailySales, DashboardAnalytics, DashboardTotals, TopProduct};

/// Repository for admin dashboard numbers.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Totals, best sellers, and the last seven days of sales.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn dashboard(&self) -> Result<DashboardAnalytics, RepositoryError> {
        Ok(DashboardAnalytics {
            totals: self.totals().await?,
            top_products: self.top_products(5).await?,
            daily: self.daily_sales(7).await?,
        })
    }

    /// Store-wide totals. Cancelled orders do not count toward revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<DashboardTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, DashboardTotals>(
            r"
            SELECT
                (SELECT COALESCE(SUM(total_amount), 0) FROM shop.orders
                    WHERE status <> 'cancelled') AS revenue,
                (SELECT COUNT(*) FROM shop.orders) AS orders,
                (SELECT COUNT(*) FROM shop.products WHERE is_active = TRUE) AS active_products,
                (SELECT COUNT(*) FROM shop.profiles) AS users
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(totals)
    }

    /// Best-selling products by units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, RepositoryError> {
        let products = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT i.product_id,
                   MAX(i.product_name) AS name,
                   SUM(i.quantity)::BIGINT AS quantity_sold,
                   SUM(i.quantity * i.unit_price) AS revenue
            FROM shop.order_items i
            JOIN shop.orders o ON o.id = i.order_id
            WHERE o.status <> 'cancelled'
            GROUP BY i.product_id
            ORDER BY quantity_sold DESC, revenue DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Orders and revenue per day, oldest first, with empty days included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_sales(&self, days: i32) -> Result<Vec<DailySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySales>(
            r"
            SELECT d.day::DATE AS day,
                   COUNT(o.id) AS orders,
                   COALESCE(SUM(o.total_amount), 0) AS revenue
            FROM generate_series(
                CURRENT_DATE - ($1 - 1) * INTERVAL '1 day',
                CURRENT_DATE,
                INTERVAL '1 day'
            ) AS d(day)
            LEFT JOIN shop.orders o
                ON o.created_at::DATE = d.day::DATE AND o.status <> 'cancelled'
            GROUP BY d.day
            ORDER BY d.day
            ",
        )
        .bind(days)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
