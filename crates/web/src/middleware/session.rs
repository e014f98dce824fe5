//! Session layer configuration.
//!
//! The session holds a single value, the auth provider's access token. The
//! cookie is private (encrypted and authenticated with a key derived from
//! `SESSION_SECRET`); the session body lives in the store.

use axum::Router;
use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dreampic_session";

/// Session key holding the provider access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the cookie key from the session secret.
///
/// Falls back to a random key (sessions won't survive a restart) if the
/// secret is too short, which config validation should already prevent.
#[must_use]
pub fn cookie_key(config: &WebConfig) -> Key {
    match Key::try_from(config.session_secret.expose_secret().as_bytes()) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "SESSION_SECRET unusable as cookie key, using a random key");
            Key::generate()
        }
    }
}

/// Wrap `router` in a session layer backed by `store`.
pub fn with_session_layer<T, S>(router: Router<T>, store: S, config: &WebConfig) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
    S: SessionStore + Clone,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_private(cookie_key(config));

    router.layer(layer)
}

/// Read the access token, treating an unreadable session as logged out.
pub async fn access_token(session: &Session) -> Option<String> {
    match session.get::<String>(ACCESS_TOKEN_KEY).await {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    }
}

/// Store the access token after a login.
///
/// Rotates the session ID first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_access_token(
    session: &Session,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(ACCESS_TOKEN_KEY, token).await
}
