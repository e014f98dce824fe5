//! Integration tests for dreampic.
//!
//! Drives the real router (middleware, handlers, templates, sessions) with
//! in-memory stand-ins for Postgres and Supabase, so no services are needed:
//!
//! ```bash
//! cargo test -p dreampic-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - login, signup, logout, OAuth callback, password changes
//! - `account_flow` - route guards, account setup, profile settings
//! - `site` - health check, static assets, security headers

#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, header},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;
use uuid::Uuid;

use dreampic_core::{Account, AccountId};
use dreampic_web::config::{SupabaseConfig, WebConfig};
use dreampic_web::db::{AccountStore, RepositoryError};
use dreampic_web::middleware::session::SESSION_COOKIE_NAME;
use dreampic_web::services::auth::{
    AuthError, AuthProvider, AuthSession, Credentials, ProviderUser,
};
use dreampic_web::state::AppState;

// =============================================================================
// Account store
// =============================================================================

/// `AccountStore` over a vector.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    unavailable: AtomicBool,
    stale_reads: AtomicBool,
}

impl InMemoryAccountStore {
    /// Make every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make lookups miss while inserts still see existing rows, like a
    /// concurrent account setup would.
    pub fn set_stale_reads(&self, stale: bool) {
        self.stale_reads.store(stale, Ordering::SeqCst);
    }

    pub async fn find(&self, user_id: Uuid) -> Option<Account> {
        self.accounts
            .lock()
            .await
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.accounts.lock().await.len()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Timeout(Duration::from_secs(1)));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<Account, RepositoryError> {
        self.check_available()?;
        let mut accounts = self.accounts.lock().await;

        if accounts.iter().any(|a| a.user_id == user_id) {
            return Err(RepositoryError::Conflict("account already exists".to_owned()));
        }

        let next_id = i32::try_from(accounts.len() + 1).unwrap_or(i32::MAX);
        let account = Account {
            id: AccountId::new(next_id),
            user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn get_account_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Account>, RepositoryError> {
        self.check_available()?;
        if self.stale_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.find(user_id).await)
    }

    async fn update_username(
        &self,
        id: AccountId,
        username: &str,
    ) -> Result<Account, RepositoryError> {
        self.check_available()?;
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        account.username = username.to_string();
        Ok(account.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

// =============================================================================
// Auth provider
// =============================================================================

struct FakeUser {
    id: Uuid,
    password: String,
}

/// `AuthProvider` that keeps users in memory and issues `token-{id}` tokens.
#[derive(Default)]
pub struct FakeAuthProvider {
    users: Mutex<HashMap<String, FakeUser>>,
    recoveries: Mutex<Vec<String>>,
    sign_outs: Mutex<Vec<String>>,
}

impl FakeAuthProvider {
    /// Register a confirmed user and return its ID.
    pub async fn add_user(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().await.insert(
            email.to_string(),
            FakeUser {
                id,
                password: password.to_string(),
            },
        );
        id
    }

    /// The access token the provider issues for a user.
    pub fn token_for(id: Uuid) -> String {
        format!("token-{id}")
    }

    /// Emails that were sent a recovery link.
    pub async fn recoveries(&self) -> Vec<String> {
        self.recoveries.lock().await.clone()
    }

    /// Tokens that were signed out.
    pub async fn sign_outs(&self) -> Vec<String> {
        self.sign_outs.lock().await.clone()
    }

    async fn find_by_token(&self, access_token: &str) -> Option<(String, Uuid)> {
        let id = access_token
            .strip_prefix("token-")
            .and_then(|id| Uuid::parse_str(id).ok())?;
        self.users
            .lock()
            .await
            .iter()
            .find(|(_, user)| user.id == id)
            .map(|(email, user)| (email.clone(), user.id))
    }
}

fn api_error(status: u16, message: &str) -> AuthError {
    AuthError::Api {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError> {
        let mut users = self.users.lock().await;
        if users.contains_key(&credentials.email) {
            return Err(api_error(422, "User already registered"));
        }

        let id = Uuid::new_v4();
        users.insert(
            credentials.email.clone(),
            FakeUser {
                id,
                password: credentials.password.expose_secret().to_string(),
            },
        );
        Ok(ProviderUser {
            id,
            email: Some(credentials.email.clone()),
        })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let users = self.users.lock().await;
        let user = users
            .get(&credentials.email)
            .filter(|u| u.password == credentials.password.expose_secret())
            .ok_or_else(|| api_error(400, "Invalid login credentials"))?;

        Ok(AuthSession {
            access_token: Self::token_for(user.id),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token: "refresh".to_string(),
            user: ProviderUser {
                id: user.id,
                email: Some(credentials.email.clone()),
            },
        })
    }

    async fn user(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let (email, id) = self
            .find_by_token(access_token)
            .await
            .ok_or_else(|| api_error(401, "invalid JWT"))?;
        Ok(ProviderUser {
            id,
            email: Some(email),
        })
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<ProviderUser, AuthError> {
        let (email, id) = self
            .find_by_token(access_token)
            .await
            .ok_or_else(|| api_error(401, "invalid JWT"))?;

        if let Some(user) = self.users.lock().await.get_mut(&email) {
            user.password = password.expose_secret().to_string();
        }
        Ok(ProviderUser {
            id,
            email: Some(email),
        })
    }

    async fn reset_password_for_email(&self, email: &str) -> Result<(), AuthError> {
        self.recoveries.lock().await.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.sign_outs.lock().await.push(access_token.to_string());
        Ok(())
    }

    fn provider_sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse("https://auth.test/auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }
}

// =============================================================================
// Test application
// =============================================================================

/// Configuration that never touches the environment.
pub fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://localhost/dreampic_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(
            "q8Zr2LwX7vNc4PtY1sKd9HbF6mJg3QeA0uRi5WoT8xVn2ClE7yGz4SpB1kMf6DhU",
        ),
        supabase: SupabaseConfig {
            url: Url::parse("https://auth.test").unwrap_or_else(|e| panic!("{e}")),
            secret: SecretString::from("test-api-key"),
        },
        google_callback_url: "http://localhost:3000/auth/callback".to_string(),
        debug: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The router plus handles on its collaborators.
pub struct TestApp {
    router: Router,
    pub accounts: Arc<InMemoryAccountStore>,
    pub auth: Arc<FakeAuthProvider>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let accounts = Arc::new(InMemoryAccountStore::default());
        let auth = Arc::new(FakeAuthProvider::default());
        let state = AppState::new(test_config(), accounts.clone(), auth.clone());

        Self {
            router: dreampic_web::app(state, MemoryStore::default()),
            accounts,
            auth,
        }
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, request: TestRequest) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request.build())
            .await
            .unwrap_or_else(|never| match never {});

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Register a user with the provider and log in through `/login`.
    ///
    /// Returns the user's ID and the session cookie.
    pub async fn login(&self, email: &str, password: &str) -> (Uuid, String) {
        let id = self.auth.add_user(email, password).await;
        let response = self
            .send(TestRequest::post("/login", &[("email", email), ("password", password)]).htmx())
            .await;

        let cookie = response
            .session_cookie()
            .unwrap_or_else(|| panic!("login did not set a session cookie: {response:?}"));
        (id, cookie)
    }

    /// Give a provider user an account directly in the store.
    pub async fn create_account(&self, user_id: Uuid, username: &str) -> Account {
        self.accounts
            .create_account(user_id, username)
            .await
            .unwrap_or_else(|e| panic!("failed to create account: {e}"))
    }
}

/// A request under construction.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(HeaderName, String)>,
    form: Option<String>,
}

impl TestRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            form: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str, form: &[(&str, &str)]) -> Self {
        Self::new(Method::POST, path).form(form)
    }

    pub fn put(path: &str, form: &[(&str, &str)]) -> Self {
        Self::new(Method::PUT, path).form(form)
    }

    fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.form = Some(
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
        );
        self
    }

    /// Mark the request as coming from htmx.
    pub fn htmx(self) -> Self {
        self.header(HeaderName::from_static("hx-request"), "true")
    }

    /// Send a `name=value` cookie.
    pub fn cookie(self, cookie: &str) -> Self {
        self.header(header::COOKIE, cookie)
    }

    /// Authenticate with a bearer token instead of a session.
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION, &format!("Bearer {token}"))
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.path);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body = match self.form {
            Some(form) => {
                builder = builder.header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                Body::from(form)
            }
            None => Body::empty(),
        };

        builder
            .body(body)
            .unwrap_or_else(|e| panic!("invalid test request: {e}"))
    }
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: impl axum::http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Where a 303 points.
    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION)
    }

    /// Where an htmx redirect points.
    pub fn hx_redirect(&self) -> Option<&str> {
        self.header("hx-redirect")
    }

    /// The `name=value` part of the session cookie, if one was set.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(String::from)
    }
}
