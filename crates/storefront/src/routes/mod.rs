//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (database)
//! GET    /uploads/*                    - Uploaded images
//!
//! # Auth
//! POST   /api/auth/register            - Create account and log in
//! POST   /api/auth/login               - Log in
//! POST   /api/auth/logout              - Log out
//! GET    /api/auth/me                  - Current profile
//! POST   /api/auth/password            - Change password
//! POST   /api/auth/forgot-password     - Email a reset link
//! POST   /api/auth/reset-password      - Set a new password from a reset link
//!
//! # Catalog
//! GET    /api/products                 - Active products (category, search, featured, brand, page)
//! GET    /api/products/{id}            - Product detail
//! GET    /api/categories               - Categories (cached)
//! GET    /api/brands                   - Brands (cached)
//! GET    /api/currencies               - Supported display currencies
//! GET    /api/currency                 - Session display currency
//! PUT    /api/currency                 - Set session display currency
//!
//! # Shopping (requires auth)
//! GET    /api/cart                     - Cart snapshot
//! POST   /api/cart                     - Add product
//! DELETE /api/cart                     - Empty cart
//! PATCH  /api/cart/{line}              - Set quantity (<= 0 removes)
//! DELETE /api/cart/{line}              - Remove line
//! GET    /api/wishlist                 - Wishlist
//! POST   /api/wishlist                 - Add product
//! DELETE /api/wishlist/{product_id}    - Remove product
//! POST   /api/checkout                 - Place order from cart
//!
//! # Orders (requires auth)
//! GET    /api/orders                   - Order history with items
//! GET    /api/orders/{id}              - Order detail with timeline
//! GET    /api/orders/{id}/tracking     - Timeline snapshot
//! GET    /api/orders/{id}/tracking/live - Timeline updates (SSE)
//! GET    /api/orders/{id}/invoice      - HTML invoice download
//!
//! # Account (requires auth)
//! GET    /api/wallet                   - Wallet balance
//! GET    /api/wallet/transactions      - Wallet ledger
//! POST   /api/wallet/top-up            - Credit wallet
//! GET    /api/profile                  - Profile
//! PATCH  /api/profile                  - Update name and phone
//! POST   /api/profile/avatar           - Upload avatar (multipart)
//!
//! # Public
//! POST   /api/contact                  - Contact form
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod currency;
pub mod health;
pub mod orders;
pub mod products;
pub mod profile;
pub mod wallet;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use soko_backend::Bucket;

use crate::config::StorefrontConfig;
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Slack on top of the largest image so multipart framing fits.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/password", post(auth::change_password))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(limited)
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
        .route("/brands", get(products::brands))
        .route("/currencies", get(currency::list))
        .route("/currency", get(currency::show).put(currency::update))
}

/// Create the cart, wishlist, and checkout routes router.
pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::show).post(cart::add).delete(cart::clear),
        )
        .route("/cart/count", get(cart::count))
        .route("/cart/{line}", patch(cart::update).delete(cart::remove))
        .route(
            "/wishlist",
            get(cart::wishlist).post(cart::add_to_wishlist),
        )
        .route(
            "/wishlist/{product_id}",
            get(cart::wishlist_status).delete(cart::remove_from_wishlist),
        )
        .route("/checkout", post(checkout::place_order))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/tracking", get(orders::tracking))
        .route("/{id}/tracking/live", get(orders::live))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the wallet and profile routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/wallet", get(wallet::show))
        .route("/wallet/transactions", get(wallet::transactions))
        .route("/wallet/top-up", post(wallet::top_up))
        .route("/profile", get(profile::show).patch(profile::update))
        .route(
            "/profile/avatar",
            post(profile::upload_avatar).layer(DefaultBodyLimit::max(
                Bucket::Avatars.max_bytes() + MULTIPART_OVERHEAD,
            )),
        )
}

/// Every `/api` route.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(catalog_routes())
        .merge(shopping_routes())
        .nest("/orders", order_routes())
        .merge(account_routes())
        .route("/contact", post(contact::submit))
        .layer(api_rate_limiter())
}

/// CORS for the storefront's own origin, with credentials.
fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    let origin = url::Url::parse(&config.base_url)
        .ok()
        .map(|url| url.origin().ascii_serialization())
        .and_then(|origin| HeaderValue::from_str(&origin).ok());
    match origin {
        Some(origin) => layer.allow_origin(origin),
        None => {
            tracing::warn!(base_url = %config.base_url, "No CORS origin derived from base URL");
            layer
        }
    }
}

/// The storefront application without a session layer.
///
/// The caller adds sessions (`PostgreSQL` in production, memory in tests),
/// tracing, and Sentry.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.files().root());
    let cors = cors_layer(state.config());

    Router::new()
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(from_fn(security_headers_middleware))
        .nest_service("/uploads", uploads)
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
