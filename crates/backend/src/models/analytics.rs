//! Dashboard analytics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use soko_core::ProductId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardTotals {
    /// Revenue from non-cancelled orders, in KES.
    pub revenue: Decimal,
    pub orders: i64,
    pub active_products: i64,
    pub users: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub orders: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardAnalytics {
    pub totals: DashboardTotals,
    pub top_products: Vec<TopProduct>,
    /// Last seven days, oldest first.
    pub daily: Vec<DailySales>,
}
