//! Declarative form field validation.
//!
//! Each form lists its fields and the rules that apply to them, then writes
//! any failures into an error sink:
//!
//! ```
//! use dreampic_core::validate::{Rule, ValidationErrors, Validator};
//!
//! let username = "ab";
//! let mut errors = ValidationErrors::default();
//! let ok = Validator::new()
//!     .field("Username", username, [Rule::Min(3), Rule::Max(50)])
//!     .validate(&mut errors);
//!
//! assert!(!ok);
//! assert_eq!(
//!     errors.get("Username"),
//!     Some("Username should be at least 3 characters long")
//! );
//! ```
//!
//! Rules for a field run in the order they were declared. Every failing rule
//! writes its message, so the last failing rule decides what the user sees.
//! A [`Rule::Message`] replaces that message whenever the field fails.

mod password;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub use password::{PASSWORD_MIN_LENGTH, PasswordError, validate_password};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,8}$").expect("email regex is valid")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http(s)?://)?([\da-z\.-]+)\.([a-z\.]{2,6})([/\w \.-]*)*/?$")
        .expect("url regex is valid")
});

/// A single check applied to a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The field must not be empty.
    Required,
    /// The field must look like a lowercase email address.
    Email,
    /// The field must look like a URL.
    Url,
    /// The field must be a strong password (see [`validate_password`]).
    Password,
    /// The field must have at least this many characters.
    Min(usize),
    /// The field must have at most this many characters.
    Max(usize),
    /// The field must equal this exact value.
    Equal(String),
    /// Shown instead of the default message when the field fails.
    Message(String),
}

impl Rule {
    /// Run the rule against a value.
    ///
    /// Returns the failure message, or `None` if the value passes.
    /// [`Rule::Message`] never fails on its own.
    #[must_use]
    pub fn check(&self, field: &str, value: &str) -> Option<String> {
        match self {
            Self::Required => {
                value.is_empty().then(|| format!("{field} is a required field"))
            }
            Self::Email => {
                (!EMAIL_REGEX.is_match(value)).then(|| "email address is invalid".to_string())
            }
            Self::Url => (!URL_REGEX.is_match(value)).then(|| "not a valid url".to_string()),
            Self::Password => validate_password(value).err().map(|e| e.to_string()),
            Self::Min(n) => (value.chars().count() < *n)
                .then(|| format!("{field} should be at least {n} characters long")),
            Self::Max(n) => (value.chars().count() > *n)
                .then(|| format!("{field} should be maximum {n} characters long")),
            Self::Equal(expected) => {
                (value != expected).then(|| format!("{field} should be equal {expected}"))
            }
            Self::Message(_) => None,
        }
    }
}

/// A destination for validation messages.
///
/// Implemented by [`ValidationErrors`] and by the per-form error structs the
/// templates render, so a validator can fill either.
pub trait FieldErrors {
    /// Record the message for a field, replacing any earlier one.
    fn set(&mut self, field: &'static str, message: String);
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FieldErrors for ValidationErrors {
    fn set(&mut self, field: &'static str, message: String) {
        self.0.insert(field, message);
    }
}

struct Field<'a> {
    name: &'static str,
    value: &'a str,
    rules: Vec<Rule>,
}

/// Collects fields and their rules, then validates them in one pass.
#[derive(Default)]
pub struct Validator<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Validator<'a> {
    /// Create an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field, its current value and the rules that apply to it.
    #[must_use]
    pub fn field(
        mut self,
        name: &'static str,
        value: &'a str,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.fields.push(Field {
            name,
            value,
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// Run every rule and write failures into `errors`.
    ///
    /// Returns `true` when every field passed. Fields that pass are never
    /// written to `errors`.
    pub fn validate(&self, errors: &mut impl FieldErrors) -> bool {
        let mut ok = true;

        for field in &self.fields {
            let mut failure = None;
            let mut custom = None;

            for rule in &field.rules {
                if let Rule::Message(msg) = rule {
                    custom = Some(msg);
                    continue;
                }
                if let Some(msg) = rule.check(field.name, field.value) {
                    failure = Some(msg);
                }
            }

            if let Some(msg) = failure {
                ok = false;
                errors.set(field.name, custom.cloned().unwrap_or(msg));
            }
        }

        ok
    }

    /// Validate into a fresh [`ValidationErrors`].
    ///
    /// # Errors
    ///
    /// Returns the collected messages if any field failed.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.validate(&mut errors) {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(
            Rule::Required.check("Email", ""),
            Some("Email is a required field".to_string())
        );
        assert_eq!(Rule::Required.check("Email", "x"), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(Rule::Email.check("Email", "user@example.com"), None);
        assert_eq!(Rule::Email.check("Email", "first.last+tag@mail.example.io"), None);
        assert_eq!(
            Rule::Email.check("Email", "not-an-email"),
            Some("email address is invalid".to_string())
        );
        // The pattern only admits lowercase addresses.
        assert!(Rule::Email.check("Email", "User@Example.com").is_some());
        assert!(Rule::Email.check("Email", "user@example.toolongtld").is_some());
    }

    #[test]
    fn test_url() {
        assert_eq!(Rule::Url.check("Site", "https://example.com/path"), None);
        assert_eq!(Rule::Url.check("Site", "example.org"), None);
        assert_eq!(
            Rule::Url.check("Site", "not a url"),
            Some("not a valid url".to_string())
        );
    }

    #[test]
    fn test_min_max_count_characters() {
        assert!(Rule::Min(3).check("Username", "ab").is_some());
        assert!(Rule::Min(3).check("Username", "abc").is_none());
        assert!(Rule::Max(3).check("Username", "abcd").is_some());
        // 3 characters, 6 bytes
        assert!(Rule::Max(3).check("Username", "äöü").is_none());
    }

    #[test]
    fn test_password_rule_reports_reason() {
        assert_eq!(
            Rule::Password.check("Password", "short"),
            Some("Password must contain at least 8 characters".to_string())
        );
        assert_eq!(Rule::Password.check("Password", "Val1d!pass"), None);
    }

    #[test]
    fn test_validate_passes() {
        let mut errors = ValidationErrors::default();
        let ok = Validator::new()
            .field("Email", "user@example.com", [Rule::Email, Rule::Required])
            .field("Username", "dreamer", [Rule::Min(3), Rule::Max(50)])
            .validate(&mut errors);

        assert!(ok);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_last_failing_rule_wins() {
        let mut errors = ValidationErrors::default();
        let ok = Validator::new()
            .field("Email", "", [Rule::Email, Rule::Required])
            .validate(&mut errors);

        assert!(!ok);
        assert_eq!(errors.get("Email"), Some("Email is a required field"));
    }

    #[test]
    fn test_only_failing_fields_are_written() {
        let errors = Validator::new()
            .field("Email", "bad", [Rule::Email])
            .field("Username", "dreamer", [Rule::Min(3)])
            .check()
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.get("Username").is_none());
    }

    #[test]
    fn test_custom_message_replaces_default() {
        let errors = Validator::new()
            .field(
                "ConfirmPassword",
                "other",
                [
                    Rule::Equal("Secret1!".to_string()),
                    Rule::Message("Passwords must match.".to_string()),
                ],
            )
            .check()
            .unwrap_err();

        assert_eq!(errors.get("ConfirmPassword"), Some("Passwords must match."));
    }

    #[test]
    fn test_custom_message_not_written_on_success() {
        let mut errors = ValidationErrors::default();
        let ok = Validator::new()
            .field(
                "ConfirmPassword",
                "Secret1!",
                [
                    Rule::Equal("Secret1!".to_string()),
                    Rule::Message("Passwords must match.".to_string()),
                ],
            )
            .validate(&mut errors);

        assert!(ok);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_custom_error_struct() {
        #[derive(Default)]
        struct ProfileErrors {
            username: Option<String>,
        }

        impl FieldErrors for ProfileErrors {
            fn set(&mut self, field: &'static str, message: String) {
                if field == "Username" {
                    self.username = Some(message);
                }
            }
        }

        let long = "x".repeat(51);
        let mut errors = ProfileErrors::default();
        let ok = Validator::new()
            .field("Username", &long, [Rule::Min(3), Rule::Max(50)])
            .validate(&mut errors);

        assert!(!ok);
        assert_eq!(
            errors.username.as_deref(),
            Some("Username should be maximum 50 characters long")
        );
    }
}
