//! Authentication middleware and extractors.
//!
//! `with_user` runs on every request and attaches an [`AuthenticatedUser`]
//! to request extensions when the request carries a valid access token. The
//! other middleware guard route groups and are applied with `route_layer`:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/settings", get(settings::index))
//!     .route_layer(from_fn_with_state(state.clone(), with_account))
//!     .route_layer(from_fn(with_auth))
//! ```
//!
//! The layer added last runs first, so `with_auth` sees the request before
//! `with_account`. Every function here passes `/public/` requests through.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, StatusCode,
        header::AUTHORIZATION,
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use dreampic_core::AuthenticatedUser;

use super::htmx::HxRequest;
use super::session::access_token;
use crate::db::RepositoryError;
use crate::error::set_sentry_user;
use crate::state::AppState;

/// Static assets under `/public/` skip every auth check.
fn is_public(request: &Request) -> bool {
    request.uri().path().starts_with("/public/")
}

/// The user attached by `with_user`, or the anonymous user.
fn current_user(request: &Request) -> AuthenticatedUser {
    request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .unwrap_or_default()
}

/// Token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Resolve the request's access token to a user.
///
/// The session token wins over a bearer header. A missing token or a token
/// the provider rejects leaves the request anonymous.
pub async fn with_user(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(&request) {
        return next.run(request).await;
    }

    let token = match access_token(&session).await {
        Some(token) => Some(token),
        None => bearer_token(request.headers()),
    };

    if let Some(token) = token {
        match state.auth().user(&token).await {
            Ok(provider_user) => {
                let user = AuthenticatedUser::logged_in(
                    provider_user.id,
                    provider_user.email.unwrap_or_default(),
                );
                set_sentry_user(&user.id, Some(&user.email));
                request.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected, continuing anonymously");
            }
        }
    }

    next.run(request).await
}

/// Send anonymous visitors to the login page.
pub async fn with_auth(request: Request, next: Next) -> Response {
    if is_public(&request) {
        return next.run(request).await;
    }

    if !current_user(&request).is_logged_in {
        return HxRequest::from_headers(request.headers()).redirect("/login");
    }

    next.run(request).await
}

/// Load the user's account, sending users without one to account setup.
pub async fn with_account(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(&request) {
        return next.run(request).await;
    }

    let user = current_user(&request);
    match state.accounts().get_account_by_user_id(user.id).await {
        Ok(Some(account)) => {
            tracing::debug!(user_id = %user.id, username = %account.username, "Account loaded");
            request.extensions_mut().insert(user.with_account(account));
            next.run(request).await
        }
        Ok(None) | Err(RepositoryError::NotFound) => {
            Redirect::to("/account/setup").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "could not fetch account data");
            (StatusCode::INTERNAL_SERVER_ERROR, "could not fetch account data").into_response()
        }
    }
}

/// Send users who already have an account home.
pub async fn redirect_if_account_exists(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_public(&request) {
        return next.run(request).await;
    }

    let user = current_user(&request);
    if user.is_logged_in {
        match state.accounts().get_account_by_user_id(user.id).await {
            Ok(Some(_)) => return Redirect::to("/").into_response(),
            Ok(None) | Err(RepositoryError::NotFound) => {}
            Err(e) => {
                tracing::error!(error = %e, user_id = %user.id, "Error fetching account");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        }
    }

    next.run(request).await
}

/// Extractor for the request's user.
///
/// Never rejects: requests without a resolved user get the anonymous user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     if user.is_logged_in { user.email } else { "guest".to_string() }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
