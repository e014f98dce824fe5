//! dreampic core - shared types and form validation.
//!
//! This crate provides the pieces used by every dreampic component:
//! - `web` - The server-rendered site (signup, login, settings)
//! - `cli` - Command-line tools for migrations and resets
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Account, request-scoped user identity and type-safe IDs
//! - [`validate`] - Declarative form field validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validate;

pub use types::*;
