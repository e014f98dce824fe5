//! Core types for dreampic.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod id;
pub mod user;

pub use account::{Account, USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH};
pub use id::*;
pub use user::AuthenticatedUser;
