//! Authentication error types.

use thiserror::Error;

/// Errors that can occur when talking to the auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API key cannot be sent as a header.
    #[error("invalid API key format: {0}")]
    InvalidApiKey(String),
}

impl AuthError {
    /// HTTP status returned by the provider, if it answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
