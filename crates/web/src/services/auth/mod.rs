//! Authentication service.
//!
//! Users, passwords and OAuth logins live in Supabase GoTrue. The site only
//! keeps the provider's access token in the session and asks the provider who
//! it belongs to on every request.

mod error;
mod supabase;
mod types;

pub use error::AuthError;
pub use supabase::SupabaseClient;
pub use types::{AuthSession, Credentials, ProviderUser};

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

/// Operations the site needs from an auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new user. The provider sends a confirmation email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the signup.
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError>;

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for wrong credentials.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;

    /// Resolve an access token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the token is invalid or expired.
    async fn user(&self, access_token: &str) -> Result<ProviderUser, AuthError>;

    /// Set a new password for the token's user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the update.
    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<ProviderUser, AuthError>;

    /// Send a password recovery email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the request.
    async fn reset_password_for_email(&self, email: &str) -> Result<(), AuthError>;

    /// Revoke the token's refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the request.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// URL that starts an OAuth login with `provider` and comes back to `redirect_to`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUrl` if the URL cannot be built.
    fn provider_sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<Url, AuthError>;
}
