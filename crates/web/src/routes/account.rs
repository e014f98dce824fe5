//! Account setup: the first stop after a user's first login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};

use dreampic_core::validate::{Rule, Validator};
use dreampic_core::{AuthenticatedUser, USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH};

use super::forms::{UsernameErrors, UsernameParams};
use crate::db::RepositoryError;
use crate::error::Result;
use crate::filters;
use crate::middleware::{CurrentUser, HxRequest};
use crate::state::AppState;

/// Account setup page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/setup.html")]
pub struct AccountSetupTemplate {
    pub user: AuthenticatedUser,
    pub params: UsernameParams,
    pub errors: UsernameErrors,
}

/// Account setup form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "account/setup_form.html")]
pub struct AccountSetupFormTemplate {
    pub params: UsernameParams,
    pub errors: UsernameErrors,
}

/// Display the account setup page.
pub async fn setup_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    AccountSetupTemplate {
        user,
        params: UsernameParams::default(),
        errors: UsernameErrors::default(),
    }
}

/// Create the user's account.
///
/// A second account for the same user is refused by the store; the user is
/// sent home as if setup had succeeded.
pub async fn setup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    hx: HxRequest,
    Form(params): Form<UsernameParams>,
) -> Result<Response> {
    let mut errors = UsernameErrors::default();
    let valid = Validator::new()
        .field(
            "Username",
            &params.username,
            [Rule::Min(USERNAME_MIN_LENGTH), Rule::Max(USERNAME_MAX_LENGTH)],
        )
        .validate(&mut errors);
    if !valid {
        return Ok(AccountSetupFormTemplate { params, errors }.into_response());
    }

    match state
        .accounts()
        .create_account(user.id, &params.username)
        .await
    {
        Ok(account) => {
            tracing::info!(user_id = %user.id, account_id = %account.id, "Account created");
            Ok(hx.redirect("/"))
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!(user_id = %user.id, "Account already exists");
            Ok(hx.redirect("/"))
        }
        Err(e) => Err(e.into()),
    }
}
