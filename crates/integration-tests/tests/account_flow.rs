//! Route guards, account setup and profile settings.

use axum::http::StatusCode;

use dreampic_integration_tests::{FakeAuthProvider, TestApp, TestRequest};

const EMAIL: &str = "sketcher@example.com";
const PASSWORD: &str = "Sk3tch-Book";

/// A logged-in user without an account, authenticated by bearer token.
async fn bearer_user(app: &TestApp) -> (uuid::Uuid, String) {
    let id = app.auth.add_user(EMAIL, PASSWORD).await;
    (id, FakeAuthProvider::token_for(id))
}

#[tokio::test]
async fn settings_redirects_anonymous_users_to_login() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/settings")).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn settings_redirects_htmx_requests_with_header() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/settings").htmx()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.hx_redirect(), Some("/login"));
}

#[tokio::test]
async fn rejected_token_is_treated_as_anonymous() {
    let app = TestApp::new();

    let response = app
        .send(TestRequest::get("/settings").bearer("token-not-a-uuid"))
        .await;

    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn settings_without_account_goes_to_setup() {
    let app = TestApp::new();
    let (_, token) = bearer_user(&app).await;

    let response = app
        .send(TestRequest::get("/settings").bearer(&token))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/setup"));
}

#[tokio::test]
async fn account_setup_creates_account() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;

    let page = app
        .send(TestRequest::get("/account/setup").bearer(&token))
        .await;
    assert_eq!(page.status, StatusCode::OK);

    let response = app
        .send(
            TestRequest::post("/account/setup", &[("username", "sketcher")])
                .bearer(&token)
                .htmx(),
        )
        .await;
    assert_eq!(response.hx_redirect(), Some("/"));

    let account = app.accounts.find(id).await.expect("account created");
    assert_eq!(account.username, "sketcher");
}

#[tokio::test]
async fn account_setup_validates_username_length() {
    let app = TestApp::new();
    let (_, token) = bearer_user(&app).await;

    let short = app
        .send(
            TestRequest::post("/account/setup", &[("username", "ab")])
                .bearer(&token)
                .htmx(),
        )
        .await;
    assert!(
        short
            .body
            .contains("Username should be at least 3 characters long")
    );

    let long = "x".repeat(51);
    let response = app
        .send(
            TestRequest::post("/account/setup", &[("username", long.as_str())])
                .bearer(&token)
                .htmx(),
        )
        .await;
    assert!(
        response
            .body
            .contains("Username should be maximum 50 characters long")
    );
    assert_eq!(app.accounts.count().await, 0);
}

#[tokio::test]
async fn account_setup_is_closed_once_account_exists() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;

    let page = app
        .send(TestRequest::get("/account/setup").bearer(&token))
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), Some("/"));

    let again = app
        .send(TestRequest::post("/account/setup", &[("username", "other")]).bearer(&token))
        .await;
    assert_eq!(again.status, StatusCode::SEE_OTHER);
    assert_eq!(again.location(), Some("/"));
    assert_eq!(app.accounts.count().await, 1);
}

#[tokio::test]
async fn concurrent_account_setup_redirects_home() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;
    app.accounts.set_stale_reads(true);

    let response = app
        .send(
            TestRequest::post("/account/setup", &[("username", "other")])
                .bearer(&token)
                .htmx(),
        )
        .await;

    assert_eq!(response.hx_redirect(), Some("/"));
    assert_eq!(app.accounts.count().await, 1);
}

#[tokio::test]
async fn settings_shows_profile() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;

    let response = app
        .send(TestRequest::get("/settings").bearer(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("value=\"sketcher\""));
    assert!(response.body.contains(EMAIL));
}

#[tokio::test]
async fn update_profile_changes_username() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;

    let response = app
        .send(
            TestRequest::put("/settings/account/profile", &[("username", "painter")])
                .bearer(&token)
                .htmx(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Your profile has been updated."));
    assert_eq!(app.accounts.find(id).await.expect("account").username, "painter");
}

#[tokio::test]
async fn update_profile_rejects_short_username() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;

    let response = app
        .send(
            TestRequest::put("/settings/account/profile", &[("username", "p")])
                .bearer(&token)
                .htmx(),
        )
        .await;

    assert!(
        response
            .body
            .contains("Username should be at least 3 characters long")
    );
    assert!(!response.body.contains("Your profile has been updated."));
    assert_eq!(app.accounts.find(id).await.expect("account").username, "sketcher");
}

#[tokio::test]
async fn settings_password_reset_sends_recovery_email() {
    let app = TestApp::new();
    let (id, token) = bearer_user(&app).await;
    app.create_account(id, "sketcher").await;

    let response = app
        .send(
            TestRequest::post("/settings/account/password/reset", &[])
                .bearer(&token)
                .htmx(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("A password reset link has been sent to"));
    assert_eq!(app.auth.recoveries().await, vec![EMAIL.to_string()]);
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let app = TestApp::new();
    let (_, token) = bearer_user(&app).await;
    app.accounts.set_unavailable(true);

    let response = app
        .send(TestRequest::get("/settings").bearer(&token))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "could not fetch account data");
}

#[tokio::test]
async fn account_setup_store_failure_is_a_server_error() {
    let app = TestApp::new();
    let (_, token) = bearer_user(&app).await;
    app.accounts.set_unavailable(true);

    let response = app
        .send(TestRequest::get("/account/setup").bearer(&token))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Internal Server Error");
}

#[tokio::test]
async fn session_token_wins_over_bearer_header() {
    let app = TestApp::new();
    let (_, cookie) = app.login("session@example.com", PASSWORD).await;
    let (_, other_token) = bearer_user(&app).await;

    let response = app
        .send(TestRequest::get("/").cookie(&cookie).bearer(&other_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Welcome back, session@example.com."));
    assert!(!response.body.contains(EMAIL));
}
