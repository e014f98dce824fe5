//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP, frame and referrer policy)
//! 6. Session layer (tower-sessions, private cookie)
//! 7. `with_user` (resolve the access token to a user)
//! 8. Route group guards (`with_auth`, `with_account`, `redirect_if_account_exists`)

pub mod auth;
pub mod csp;
pub mod htmx;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{CurrentUser, redirect_if_account_exists, with_account, with_auth, with_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use htmx::HxRequest;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{access_token, set_access_token, with_session_layer};
