//! Health check, static assets and response headers.

use axum::http::StatusCode;

use dreampic_integration_tests::{TestApp, TestRequest};

#[tokio::test]
async fn health_reports_healthy_database() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/health")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, r#"{"message":"It's healthy"}"#);
}

#[tokio::test]
async fn health_reports_database_down() {
    let app = TestApp::new();
    app.accounts.set_unavailable(true);

    let response = app.send(TestRequest::get("/health")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body.contains("db down"));
}

#[tokio::test]
async fn serves_static_assets() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/public/styles.css")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("text/css"))
    );
}

#[tokio::test]
async fn pages_carry_security_headers() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/")).await;

    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    let csp = response
        .header("content-security-policy")
        .expect("csp header");
    assert!(csp.contains("'nonce-"));
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn nonce_changes_per_request() {
    let app = TestApp::new();

    let first = app.send(TestRequest::get("/login")).await;
    let second = app.send(TestRequest::get("/login")).await;

    assert_ne!(
        first.header("content-security-policy"),
        second.header("content-security-policy")
    );
}

#[tokio::test]
async fn upstream_request_id_is_echoed() {
    let app = TestApp::new();

    let response = app
        .send(TestRequest::get("/").header(
            axum::http::HeaderName::from_static("x-request-id"),
            "edge-1234",
        ))
        .await;

    assert_eq!(response.header("x-request-id"), Some("edge-1234"));
}

#[tokio::test]
async fn anonymous_home_page_invites_signup() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("href=\"/signup\""));
}

#[tokio::test]
async fn htmx_indicator_styles_are_disabled() {
    let app = TestApp::new();

    let response = app.send(TestRequest::get("/")).await;

    // Injected indicator styles would violate `style-src 'self'`
    assert!(response.body.contains(r#"<meta name="htmx-config""#));
    assert!(response.body.contains("includeIndicatorStyles"));
    assert!(
        response
            .header("content-security-policy")
            .is_some_and(|csp| csp.contains("style-src 'self';"))
    );
}
