//! Home page and health check.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use dreampic_core::AuthenticatedUser;

use crate::filters;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub user: AuthenticatedUser,
}

/// Display the home page.
pub async fn index(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    HomeTemplate { user }
}

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Health check endpoint.
///
/// Pings the database. Returns 503 Service Unavailable if it does not answer
/// within a second.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.accounts().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                message: "It's healthy".to_string(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    message: format!("db down: {e}"),
                }),
            )
        }
    }
}
