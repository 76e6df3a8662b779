//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID
//! 4. Session layer (`SameSite=Strict`)
//! 5. Security headers (adds HSTS)
//! 6. Login rate limit
//!
//! Authorization is the [`RequireAdmin`] extractor, not a layer.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
