//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::AccountStore;
use crate::services::auth::AuthProvider;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The account store and auth provider are trait
/// objects so tests can run the router without Postgres or Supabase.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    accounts: Arc<dyn AccountStore>,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: WebConfig,
        accounts: Arc<dyn AccountStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                accounts,
                auth,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the account store.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }

    /// Get the auth provider.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }
}
