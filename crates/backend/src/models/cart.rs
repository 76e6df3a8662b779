//! Cart and wishlist lines joined with product data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use soko_core::{CartItemId, ProductId, WishlistItemId};

/// Image shown for products without any uploaded images.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Most units of one product a cart line can hold.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    /// Cart row id, used for quantity updates and removal.
    #[serde(rename = "cart_id")]
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: i32,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistLine {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image: String,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}
