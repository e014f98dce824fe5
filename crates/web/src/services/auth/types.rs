//! Request and response types for the auth provider.

use secrecy::SecretString;
use serde::Deserialize;
use uuid::Uuid;

/// Email and password submitted by a user.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued on a successful password login.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: ProviderUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Signup answers with a session when email confirmation is off, and with
/// the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(AuthSession),
    User(ProviderUser),
}

impl SignUpResponse {
    pub(super) fn into_user(self) -> ProviderUser {
        match self {
            Self::Session(session) => session.user,
            Self::User(user) => user,
        }
    }
}
