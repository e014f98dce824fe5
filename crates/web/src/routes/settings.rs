//! Settings route handlers (requires an account).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};

use dreampic_core::validate::{Rule, Validator};
use dreampic_core::{AuthenticatedUser, USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH};

use super::auth::ResetPasswordFormTemplate;
use super::forms::{
    ProfileParams, ResetPasswordErrors, ResetPasswordStatus, UsernameErrors, UsernameParams,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub user: AuthenticatedUser,
    pub params: ProfileParams,
    pub errors: UsernameErrors,
}

/// Profile form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "settings/profile_form.html")]
pub struct ProfileFormTemplate {
    pub params: ProfileParams,
    pub errors: UsernameErrors,
}

/// Display the settings page.
pub async fn index(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let params = ProfileParams {
        username: user.username().unwrap_or_default().to_string(),
        success: false,
    };

    SettingsTemplate {
        user,
        params,
        errors: UsernameErrors::default(),
    }
}

/// Change the account's username.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<UsernameParams>,
) -> Result<Response> {
    let mut params = ProfileParams {
        username: form.username,
        success: false,
    };

    let mut errors = UsernameErrors::default();
    let valid = Validator::new()
        .field(
            "Username",
            &params.username,
            [Rule::Min(USERNAME_MIN_LENGTH), Rule::Max(USERNAME_MAX_LENGTH)],
        )
        .validate(&mut errors);
    if !valid {
        return Ok(ProfileFormTemplate { params, errors }.into_response());
    }

    let account = user
        .account
        .as_ref()
        .ok_or_else(|| AppError::Internal("account not loaded".to_string()))?;

    if let Err(e) = state
        .accounts()
        .update_username(account.id, &params.username)
        .await
    {
        tracing::error!(error = %e, username = %params.username, "Failed to update username");
        return Err(e.into());
    }

    tracing::info!(account_id = %account.id, "Username updated");
    params.success = true;

    Ok(ProfileFormTemplate { params, errors }.into_response())
}

/// Email the user a password recovery link.
pub async fn reset_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    state.auth().reset_password_for_email(&user.email).await?;
    tracing::info!(user_id = %user.id, "Password recovery mail sent");

    Ok(ResetPasswordFormTemplate {
        status: ResetPasswordStatus {
            success: false,
            sent_to: Some(user.email),
        },
        errors: ResetPasswordErrors::default(),
    }
    .into_response())
}
