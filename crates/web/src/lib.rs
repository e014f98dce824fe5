//! dreampic web site.
//!
//! Server-rendered pages with htmx forms. Identity comes from Supabase
//! GoTrue; the only local data is one account row per user.
//!
//! The binary in `main.rs` wires the real collaborators (`PgAccountStore`,
//! `SupabaseClient`, `PostgresStore`). [`app`] takes them as trait objects so
//! the router can be driven in tests with in-memory replacements.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::middleware::{
    csp_nonce_middleware, request_id_middleware, security_headers_middleware, with_session_layer,
    with_user,
};
use crate::state::AppState;

/// Static assets served under `/public`.
pub const PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

/// Build the application router.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let router = Router::new()
        .merge(routes::routes(&state))
        .nest_service("/public", ServeDir::new(PUBLIC_DIR))
        .layer(from_fn_with_state(state.clone(), with_user));

    with_session_layer(router, session_store, state.config())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Span for one request. Only the path is recorded: the OAuth callback
/// carries the access token in its query string.
fn request_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_span_omits_query() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let request = Request::builder()
            .uri("/auth/callback?access_token=s3cr3t-token&token_type=bearer")
            .body(Body::empty())
            .unwrap();

        tracing::subscriber::with_default(subscriber, || {
            let span = request_span(&request);
            let _entered = span.enter();
            tracing::info!("handled");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("path=/auth/callback"));
        assert!(!output.contains("s3cr3t-token"));
    }
}
