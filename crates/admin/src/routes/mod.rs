//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness
//! GET    /health/ready                  - Readiness (database)
//!
//! # Auth
//! POST   /api/auth/login                - Password login, admins only
//! POST   /api/auth/logout               - Logout
//! GET    /api/auth/me                   - Current admin profile
//!
//! # Everything below requires an admin session
//! GET    /api/dashboard                 - Totals, best sellers, daily sales
//! GET    /api/products                  - All products
//! POST   /api/products                  - Create product
//! GET    /api/products/{id}             - Product detail
//! PUT    /api/products/{id}             - Replace product
//! DELETE /api/products/{id}             - Delete product
//! GET    /api/categories                - Categories
//! POST   /api/categories                - Create category
//! PUT    /api/categories/{id}           - Replace category
//! DELETE /api/categories/{id}           - Delete category
//! GET    /api/brands                    - Brands
//! POST   /api/brands                    - Create brand
//! PUT    /api/brands/{id}               - Replace brand
//! DELETE /api/brands/{id}               - Delete brand
//! POST   /api/uploads/{bucket}          - Image upload (multipart)
//! GET    /api/orders?status=            - Orders with customer and items
//! GET    /api/orders/{id}               - Order with customer, items, timeline
//! POST   /api/orders/{id}/status        - Append tracking entry, set status
//! GET    /api/orders/{id}/invoice       - Printable invoice (KES)
//! GET    /api/users                     - Accounts
//! PUT    /api/users/{id}/role           - Change role
//! GET    /api/contact-submissions       - Contact form inbox
//! GET    /api/settings                  - Store settings
//! PUT    /api/settings                  - Save store settings
//! ```

pub mod auth;
pub mod brands;
pub mod categories;
pub mod contact;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod settings;
pub mod uploads;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post, put},
};

use soko_backend::Bucket;

use crate::error::{AppError, Result};
use crate::middleware::{login_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Slack on top of the largest image so multipart framing fits.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Reject blank names for categories and brands.
pub(crate) fn require_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{what} name is required")));
    }
    Ok(())
}

fn largest_upload() -> usize {
    Bucket::ALL
        .into_iter()
        .map(Bucket::max_bytes)
        .max()
        .unwrap_or_default()
        + MULTIPART_OVERHEAD
}

pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .layer(login_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(limited)
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/categories", get(categories::index).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/brands", get(brands::index).post(brands::create))
        .route("/brands/{id}", put(brands::update).delete(brands::delete))
        .route(
            "/uploads/{bucket}",
            post(uploads::upload).layer(DefaultBodyLimit::max(largest_upload())),
        )
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/payment-status", put(orders::update_payment_status))
        .route("/{id}/invoice", get(orders::invoice))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/dashboard", get(dashboard::show))
        .merge(catalog_routes())
        .nest("/orders", order_routes())
        .route("/users", get(users::index))
        .route("/users/{id}/role", put(users::update_role))
        .route("/contact-submissions", get(contact::index))
        .route("/settings", get(settings::show).put(settings::update))
}

/// The admin application without a session layer.
///
/// The caller adds sessions, tracing, and Sentry.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name() {
        assert!(require_name("Kitchen", "Category").is_ok());
        let err = require_name("   ", "Brand").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Brand name is required");
    }

    #[test]
    fn test_upload_limit_covers_largest_bucket() {
        assert!(largest_upload() > Bucket::ProductImages.max_bytes());
    }
}
