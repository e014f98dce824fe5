//! htmx request detection and redirects.
//!
//! htmx follows a plain 303 inside its AJAX request and swaps the target page
//! into the form. To navigate the whole window it needs a 200 carrying
//! `HX-Redirect` instead.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

/// Set by htmx on every request it makes.
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");

/// Tells htmx to navigate the browser.
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

/// Whether the request came from htmx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl HxRequest {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(headers.contains_key(HX_REQUEST))
    }

    /// Redirect the browser to `to`, whichever way the request was made.
    #[must_use]
    pub fn redirect(self, to: &str) -> Response {
        if !self.0 {
            return Redirect::to(to).into_response();
        }

        match HeaderValue::from_str(to) {
            Ok(value) => (StatusCode::OK, [(HX_REDIRECT, value)]).into_response(),
            Err(e) => {
                tracing::error!(error = %e, location = to, "Invalid redirect target");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
