//! Authentication route handlers.
//!
//! Login, signup, logout, the OAuth callback and password changes, all
//! delegated to the auth provider. Form posts come from htmx and are answered
//! with the re-rendered form fragment or an `HX-Redirect`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use dreampic_core::AuthenticatedUser;
use dreampic_core::validate::{Rule, Validator};

use super::forms::{
    LoginErrors, LoginParams, ResetPasswordErrors, ResetPasswordParams, ResetPasswordStatus,
    SignupErrors, SignupParams,
};
use crate::error::{Result, add_breadcrumb, clear_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, CurrentUser, HxRequest, access_token, set_access_token};
use crate::services::auth::Credentials;
use crate::state::AppState;

/// OAuth provider behind the "Login with Google" button.
const GOOGLE_PROVIDER: &str = "google";

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: AuthenticatedUser,
    pub params: LoginParams,
    pub errors: LoginErrors,
}

/// Login form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login_form.html")]
pub struct LoginFormTemplate {
    pub params: LoginParams,
    pub errors: LoginErrors,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub user: AuthenticatedUser,
    pub params: SignupParams,
    pub errors: SignupErrors,
}

/// Signup form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup_form.html")]
pub struct SignupFormTemplate {
    pub params: SignupParams,
    pub errors: SignupErrors,
}

/// Shown in place of the signup form once the provider accepted it.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup_success.html")]
pub struct SignupSuccessTemplate {
    pub email: String,
}

/// OAuth landing page.
///
/// The provider puts the token in the URL fragment, which never reaches the
/// server; the page's script resubmits it as a query string.
#[derive(Template, WebTemplate)]
#[template(path = "auth/callback.html")]
pub struct CallbackTemplate {
    pub user: AuthenticatedUser,
    pub nonce: String,
}

/// New password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub user: AuthenticatedUser,
    pub status: ResetPasswordStatus,
    pub errors: ResetPasswordErrors,
}

/// New password form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password_form.html")]
pub struct ResetPasswordFormTemplate {
    pub status: ResetPasswordStatus,
    pub errors: ResetPasswordErrors,
}

// =============================================================================
// Query Types
// =============================================================================

/// Token handed back by the OAuth flow.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackQuery {
    pub access_token: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    LoginTemplate {
        user,
        params: LoginParams::default(),
        errors: LoginErrors::default(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(mut params): Form<LoginParams>,
) -> Result<Response> {
    let mut errors = LoginErrors::default();
    let valid = Validator::new()
        .field("Email", &params.email, [Rule::Email, Rule::Required])
        .field("Password", &params.password, [Rule::Password, Rule::Required])
        .validate(&mut errors);
    if !valid {
        return Ok(LoginFormTemplate { params, errors }.into_response());
    }

    let credentials = Credentials::new(params.email.clone(), std::mem::take(&mut params.password));
    match state.auth().sign_in(&credentials).await {
        Ok(auth) => {
            set_access_token(&session, &auth.access_token).await?;
            tracing::info!(user_id = %auth.user.id, "User logged in");
            Ok(hx.redirect("/"))
        }
        Err(e) => {
            tracing::warn!(error = %e, email = %params.email, "Login failed");
            let errors = LoginErrors {
                invalid_credentials: Some("Invalid credentials.".to_string()),
                ..LoginErrors::default()
            };
            Ok(LoginFormTemplate { params, errors }.into_response())
        }
    }
}

/// Start a Google login through the provider.
pub async fn login_with_google(State(state): State<AppState>, hx: HxRequest) -> Result<Response> {
    let url = state
        .auth()
        .provider_sign_in_url(GOOGLE_PROVIDER, &state.config().google_callback_url)?;
    Ok(hx.redirect(url.as_str()))
}

/// Finish an OAuth login.
pub async fn callback(
    session: Session,
    hx: HxRequest,
    nonce: CspNonce,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    if query.access_token.is_empty() {
        return Ok(CallbackTemplate {
            user,
            nonce: nonce.0,
        }
        .into_response());
    }

    set_access_token(&session, &query.access_token).await?;
    tracing::info!("User logged in via OAuth");
    Ok(hx.redirect("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    SignupTemplate {
        user,
        params: SignupParams::default(),
        errors: SignupErrors::default(),
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    Form(mut params): Form<SignupParams>,
) -> Result<Response> {
    let mut errors = SignupErrors::default();
    let valid = Validator::new()
        .field("Email", &params.email, [Rule::Email, Rule::Required])
        .field("Password", &params.password, [Rule::Password, Rule::Required])
        .field(
            "ConfirmPassword",
            &params.confirm_password,
            [
                Rule::Equal(params.password.clone()),
                Rule::Message("Passwords must match.".to_string()),
            ],
        )
        .validate(&mut errors);
    if !valid {
        return Ok(SignupFormTemplate { params, errors }.into_response());
    }

    let credentials = Credentials::new(params.email.clone(), std::mem::take(&mut params.password));
    params.confirm_password.clear();

    match state.auth().sign_up(&credentials).await {
        Ok(user) => {
            let user_id = user.id.to_string();
            tracing::info!(user_id = %user_id, "User signed up");
            add_breadcrumb("auth", "Signed up", Some(&[("user_id", user_id.as_str())]));
            Ok(SignupSuccessTemplate {
                email: user.email.unwrap_or(params.email),
            }
            .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, email = %params.email, "Signup failed");
            let errors = SignupErrors {
                signup: Some("Signup failed.".to_string()),
                ..SignupErrors::default()
            };
            Ok(SignupFormTemplate { params, errors }.into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and drop the session.
///
/// Revoking the token at the provider is best effort; the session is cleared
/// either way.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
) -> Result<Response> {
    if let Some(token) = access_token(&session).await
        && let Err(e) = state.auth().sign_out(&token).await
    {
        tracing::warn!(error = %e, "Provider sign-out failed");
    }

    session.flush().await?;
    clear_sentry_user();

    Ok(hx.redirect("/"))
}

// =============================================================================
// Password Routes
// =============================================================================

/// Display the new password page.
pub async fn reset_password_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    ResetPasswordTemplate {
        user,
        status: ResetPasswordStatus::default(),
        errors: ResetPasswordErrors::default(),
    }
}

/// Set a new password for the logged-in user.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(params): Form<ResetPasswordParams>,
) -> Result<Response> {
    let Some(token) = access_token(&session).await else {
        return Ok(hx.redirect("/"));
    };

    let mut errors = ResetPasswordErrors::default();
    let valid = Validator::new()
        .field(
            "Password",
            &params.new_password,
            [Rule::Password, Rule::Required],
        )
        .validate(&mut errors);
    if !valid {
        return Ok(ResetPasswordFormTemplate {
            status: ResetPasswordStatus::default(),
            errors,
        }
        .into_response());
    }

    let user = state
        .auth()
        .update_password(&token, &SecretString::from(params.new_password))
        .await?;
    tracing::info!(user_id = %user.id, "Account password updated");

    Ok(ResetPasswordFormTemplate {
        status: ResetPasswordStatus {
            success: true,
            sent_to: None,
        },
        errors,
    }
    .into_response())
}
