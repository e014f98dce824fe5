//! Request-scoped identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Account;

/// The identity attached to a single request.
///
/// Resolved from the session's access token (or a bearer token) by asking the
/// auth provider who the token belongs to. The default value is the anonymous
/// visitor: nil id, empty email, not logged in, no account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Auth-provider user ID.
    pub id: Uuid,
    /// Email address reported by the auth provider.
    pub email: String,
    /// Whether the request carried a valid token.
    pub is_logged_in: bool,
    /// The user's account, once loaded by the account middleware.
    pub account: Option<Account>,
}

impl AuthenticatedUser {
    /// A logged-in user without a loaded account.
    #[must_use]
    pub fn logged_in(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            is_logged_in: true,
            account: None,
        }
    }

    /// The anonymous visitor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Attach a loaded account.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    /// Username of the attached account, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::AccountId;

    #[test]
    fn test_anonymous_is_default() {
        let user = AuthenticatedUser::anonymous();
        assert!(!user.is_logged_in);
        assert!(user.id.is_nil());
        assert!(user.email.is_empty());
        assert!(user.username().is_none());
    }

    #[test]
    fn test_with_account_exposes_username() {
        let id = Uuid::new_v4();
        let user = AuthenticatedUser::logged_in(id, "a@b.co").with_account(Account {
            id: AccountId::new(1),
            user_id: id,
            username: "dreamer".to_string(),
            created_at: Utc::now(),
        });

        assert!(user.is_logged_in);
        assert_eq!(user.username(), Some("dreamer"));
    }
}
