//! Cart and wishlist route handlers.
//!
//! Every mutation answers with the fresh snapshot so clients never need a
//! second round trip.

use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use soko_backend::db::{CartRepository, WishlistRepository};
use soko_backend::models::{CartLine, MAX_LINE_QUANTITY, WishlistLine};
use soko_core::{CartItemId, CartSummary, ProductId, UserId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Badge count for the header.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

/// Whether one product is on the wishlist.
#[derive(Debug, Serialize)]
pub struct WishlistStatus {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

/// Cart snapshot.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: i64,
}

impl From<Vec<CartLine>> for CartResponse {
    fn from(items: Vec<CartLine>) -> Self {
        let summary = CartSummary::from_lines(items.iter().map(|l| (l.price, l.quantity)));
        Self {
            items,
            total: summary.total,
            item_count: summary.item_count,
        }
    }
}

fn check_quantity(quantity: i32) -> Result<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity cannot exceed {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

async fn cart_snapshot(state: &AppState, user_id: UserId) -> Result<Json<CartResponse>> {
    let items = CartRepository::new(state.pool()).list(user_id).await?;
    Ok(Json(CartResponse::from(items)))
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /api/cart`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    cart_snapshot(&state, user.id).await
}

/// `GET /api/cart/count`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartCount>> {
    let count = CartRepository::new(state.pool()).count(user.id).await?;
    Ok(Json(CartCount { count }))
}

/// `POST /api/cart`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    if request.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    check_quantity(request.quantity)?;
    CartRepository::new(state.pool())
        .add(user.id, request.product_id, request.quantity)
        .await?;

    let product_id = request.product_id.to_string();
    let data = [("product_id", product_id.as_str())];
    add_breadcrumb("cart", "Added to cart", Some(data.as_slice()));

    cart_snapshot(&state, user.id).await
}

/// `PATCH /api/cart/{line}`. A quantity of zero or less removes the line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(line): Path<CartItemId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>> {
    check_quantity(request.quantity)?;
    CartRepository::new(state.pool())
        .set_quantity(user.id, line, request.quantity)
        .await?;
    cart_snapshot(&state, user.id).await
}

/// `DELETE /api/cart/{line}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(line): Path<CartItemId>,
) -> Result<Json<CartResponse>> {
    CartRepository::new(state.pool()).remove(user.id, line).await?;
    cart_snapshot(&state, user.id).await
}

/// `DELETE /api/cart`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(CartResponse::from(Vec::new())))
}

// =============================================================================
// Wishlist
// =============================================================================

/// `GET /api/wishlist`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistLine>>> {
    Ok(Json(WishlistRepository::new(state.pool()).list(user.id).await?))
}

/// `POST /api/wishlist`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<WishlistRequest>,
) -> Result<Json<Vec<WishlistLine>>> {
    let wishlist = WishlistRepository::new(state.pool());
    wishlist.add(user.id, request.product_id).await?;
    Ok(Json(wishlist.list(user.id).await?))
}

/// `GET /api/wishlist/{product_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn wishlist_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<WishlistStatus>> {
    let in_wishlist = WishlistRepository::new(state.pool())
        .contains(user.id, product_id)
        .await?;
    Ok(Json(WishlistStatus {
        product_id,
        in_wishlist,
    }))
}

/// `DELETE /api/wishlist/{product_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<WishlistLine>>> {
    let wishlist = WishlistRepository::new(state.pool());
    wishlist.remove(user.id, product_id).await?;
    Ok(Json(wishlist.list(user.id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn line(price: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(Uuid::new_v4()),
            product_id: ProductId::new(Uuid::new_v4()),
            name: "Maasai shuka".to_string(),
            price: Decimal::new(price, 0),
            image: "/placeholder.svg".to_string(),
            quantity,
            stock_quantity: 10,
        }
    }

    #[test]
    fn test_cart_response_totals() {
        let response = CartResponse::from(vec![line(1200, 2), line(350, 1)]);
        assert_eq!(response.total, Decimal::new(2750, 0));
        assert_eq!(response.item_count, 3);
    }

    #[test]
    fn test_cart_line_serializes_cart_id() {
        let json = serde_json::to_value(CartResponse::from(vec![line(10, 1)])).unwrap();
        assert!(json["items"][0]["cart_id"].is_string());
        assert_eq!(json["item_count"], 1);
    }

    #[test]
    fn test_quantity_cap() {
        assert!(check_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(check_quantity(0).is_ok());
        let err = check_quantity(i32::MAX).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_add_request_defaults_quantity() {
        let request: AddToCartRequest = serde_json::from_value(serde_json::json!({
            "product_id": Uuid::nil()
        }))
        .unwrap();
        assert_eq!(request.quantity, 1);
    }
}
