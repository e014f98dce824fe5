//! Supabase GoTrue REST client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::SignUpResponse;
use super::{AuthError, AuthProvider, AuthSession, Credentials, ProviderUser};
use crate::config::SupabaseConfig;

/// GoTrue client authenticated with the project API key.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: Url,
    secret: SecretString,
}

impl SupabaseClient {
    /// Create a new Supabase auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(config.secret.expose_secret())
            .map_err(|e| AuthError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        // Joining relative paths drops the last segment unless it ends in '/'
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            secret: config.secret.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a request and decode a JSON body, mapping non-2xx answers.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AuthError> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-2xx response into `AuthError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// GoTrue reports errors under different keys depending on the endpoint.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}

fn credentials_body(credentials: &Credentials) -> serde_json::Value {
    serde_json::json!({
        "email": credentials.email,
        "password": credentials.password.expose_secret(),
    })
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError> {
        let request = self
            .client
            .post(self.endpoint("auth/v1/signup")?)
            .bearer_auth(self.secret.expose_secret())
            .json(&credentials_body(credentials));

        let response: SignUpResponse = self.send_json(request).await?;
        Ok(response.into_user())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .client
            .post(url)
            .bearer_auth(self.secret.expose_secret())
            .json(&credentials_body(credentials));

        self.send_json(request).await
    }

    async fn user(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let request = self
            .client
            .get(self.endpoint("auth/v1/user")?)
            .bearer_auth(access_token);

        self.send_json(request).await
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<ProviderUser, AuthError> {
        let request = self
            .client
            .put(self.endpoint("auth/v1/user")?)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": password.expose_secret() }));

        self.send_json(request).await
    }

    async fn reset_password_for_email(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("auth/v1/recover")?)
            .bearer_auth(self.secret.expose_secret())
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("auth/v1/logout")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    fn provider_sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }
}
