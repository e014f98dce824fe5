//! Form payloads and their per-field error messages.
//!
//! Every form posts into a params struct and renders back with an errors
//! struct. The errors structs implement `FieldErrors` so a `Validator` can
//! write into them by field label.

use dreampic_core::validate::FieldErrors;
use serde::Deserialize;

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct LoginErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub invalid_credentials: Option<String>,
}

impl FieldErrors for LoginErrors {
    fn set(&mut self, field: &'static str, message: String) {
        match field {
            "Email" => self.email = Some(message),
            "Password" => self.password = Some(message),
            _ => {}
        }
    }
}

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupParams {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default)]
pub struct SignupErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub signup: Option<String>,
}

impl FieldErrors for SignupErrors {
    fn set(&mut self, field: &'static str, message: String) {
        match field {
            "Email" => self.email = Some(message),
            "Password" => self.password = Some(message),
            "ConfirmPassword" => self.confirm_password = Some(message),
            _ => {}
        }
    }
}

/// Account setup and profile form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsernameParams {
    pub username: String,
}

/// Profile form state, including whether the last save succeeded.
#[derive(Debug, Default)]
pub struct ProfileParams {
    pub username: String,
    pub success: bool,
}

#[derive(Debug, Default)]
pub struct UsernameErrors {
    pub username: Option<String>,
}

impl FieldErrors for UsernameErrors {
    fn set(&mut self, field: &'static str, message: String) {
        if field == "Username" {
            self.username = Some(message);
        }
    }
}

/// New password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordParams {
    pub new_password: String,
}

#[derive(Debug, Default)]
pub struct ResetPasswordErrors {
    pub new_password: Option<String>,
}

impl FieldErrors for ResetPasswordErrors {
    fn set(&mut self, field: &'static str, message: String) {
        if field == "Password" {
            self.new_password = Some(message);
        }
    }
}

/// Outcome shown above the new password form.
#[derive(Debug, Default)]
pub struct ResetPasswordStatus {
    /// The password was changed.
    pub success: bool,
    /// A recovery email was sent to this address.
    pub sent_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use dreampic_core::validate::{Rule, Validator};

    use super::*;

    #[test]
    fn test_signup_errors_by_label() {
        let params = SignupParams {
            email: "not-an-email".to_string(),
            password: "Sup3r$ecret".to_string(),
            confirm_password: "different".to_string(),
        };

        let mut errors = SignupErrors::default();
        let ok = Validator::new()
            .field("Email", &params.email, [Rule::Email, Rule::Required])
            .field("Password", &params.password, [Rule::Password, Rule::Required])
            .field(
                "ConfirmPassword",
                &params.confirm_password,
                [
                    Rule::Equal(params.password.clone()),
                    Rule::Message("Passwords must match.".to_string()),
                ],
            )
            .validate(&mut errors);

        assert!(!ok);
        assert_eq!(errors.email.as_deref(), Some("email address is invalid"));
        assert!(errors.password.is_none());
        assert_eq!(
            errors.confirm_password.as_deref(),
            Some("Passwords must match.")
        );
        assert!(errors.signup.is_none());
    }

    #[test]
    fn test_reset_password_errors_map_password_label() {
        let mut errors = ResetPasswordErrors::default();
        errors.set("Password", "too weak".to_string());
        errors.set("Other", "ignored".to_string());
        assert_eq!(errors.new_password.as_deref(), Some("too weak"));
    }
}
