//! Persisted user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;

/// Minimum username length, in characters.
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length, in characters.
pub const USERNAME_MAX_LENGTH: usize = 50;

/// A user's profile record.
///
/// Every auth-provider user owns at most one account. The account is created
/// during account setup and its username can be changed from the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Database ID.
    pub id: AccountId,
    /// Auth-provider user that owns this account.
    pub user_id: Uuid,
    /// Public display name.
    pub username: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
