//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check (database ping)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action (htmx)
//! GET  /login/provider/google  - Start Google OAuth login
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action (htmx)
//! POST /logout                 - Logout action
//! GET  /auth/callback          - OAuth callback
//!
//! # Requires login
//! GET  /auth/reset-password    - New password page
//! PUT  /auth/reset-password    - Set new password (htmx)
//!
//! # Requires login, no account yet
//! GET  /account/setup          - Account setup page
//! POST /account/setup          - Create account (htmx)
//!
//! # Requires login and account
//! GET  /settings                           - Settings page
//! PUT  /settings/account/profile           - Update username (htmx)
//! POST /settings/account/password/reset    - Send password recovery email (htmx)
//! ```

pub mod account;
pub mod auth;
pub mod forms;
pub mod home;
pub mod settings;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};

use crate::middleware::{redirect_if_account_exists, with_account, with_auth};
use crate::state::AppState;

/// Routes open to everyone.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(home::health))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/provider/google", get(auth::login_with_google))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/auth/callback", get(auth::callback))
}

/// Routes for logged-in users, with or without an account.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/reset-password",
            get(auth::reset_password_page).put(auth::reset_password),
        )
        .route_layer(from_fn(with_auth))
}

/// Account setup, only until the account exists.
fn account_setup_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/account/setup",
            get(account::setup_page).post(account::setup),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            redirect_if_account_exists,
        ))
        .route_layer(from_fn(with_auth))
}

/// Routes that need the user's account loaded.
fn settings_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/settings", get(settings::index))
        .route("/settings/account/profile", put(settings::update_profile))
        .route(
            "/settings/account/password/reset",
            post(settings::reset_password),
        )
        .route_layer(from_fn_with_state(state.clone(), with_account))
        .route_layer(from_fn(with_auth))
}

/// Create all routes for the site.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(auth_routes())
        .merge(account_setup_routes(state))
        .merge(settings_routes(state))
}
