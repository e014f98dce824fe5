//! Password strength rules.

use thiserror::Error;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Minimum password length, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Special characters accepted whatever their Unicode category.
const SPECIAL_CHARS: &str = "!@#$%^&*";

/// Why a password was rejected. The `Display` output is shown to users as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Password must contain at least 8 characters")]
    TooShort,
    #[error("Password must contain at least 1 uppercase character")]
    MissingUppercase,
    #[error("Password must contain at least 1 lowercase character")]
    MissingLowercase,
    #[error("Password must contain at least 1 numeric character (0, 1, 2, ...)")]
    MissingDigit,
    #[error("Password must contain at least 1 special character (@, ;, _, ...)")]
    MissingSpecial,
}

/// Check that a password is strong enough.
///
/// A strong password:
/// - is at least 8 characters long
/// - contains at least one uppercase letter
/// - contains at least one lowercase letter
/// - contains at least one digit
/// - contains at least one special character (punctuation or symbol)
///
/// Checks run in that order and the first failure is reported.
///
/// # Errors
///
/// Returns the first [`PasswordError`] the password violates.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        match get_general_category(c) {
            GeneralCategory::UppercaseLetter => has_upper = true,
            GeneralCategory::LowercaseLetter => has_lower = true,
            GeneralCategory::DecimalNumber => has_digit = true,
            category if is_special(c, &category) => has_special = true,
            _ => {}
        }
    }

    if !has_upper {
        return Err(PasswordError::MissingUppercase);
    }
    if !has_lower {
        return Err(PasswordError::MissingLowercase);
    }
    if !has_digit {
        return Err(PasswordError::MissingDigit);
    }
    if !has_special {
        return Err(PasswordError::MissingSpecial);
    }

    Ok(())
}

/// Punctuation (P*) and symbols (S*) count, plus the ASCII set above.
fn is_special(c: char, category: &GeneralCategory) -> bool {
    matches!(
        category,
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    ) || SPECIAL_CHARS.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password() {
        assert_eq!(validate_password("Sup3r$ecret"), Ok(()));
        assert_eq!(validate_password("aB3;aaaa"), Ok(()));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(validate_password("aB3!"), Err(PasswordError::TooShort));
        assert_eq!(validate_password(""), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 7 characters, but more than 8 bytes
        assert_eq!(validate_password("Ünï3!ab"), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_missing_classes_in_order() {
        assert_eq!(
            validate_password("lowercase1!"),
            Err(PasswordError::MissingUppercase)
        );
        assert_eq!(
            validate_password("UPPERCASE1!"),
            Err(PasswordError::MissingLowercase)
        );
        assert_eq!(
            validate_password("NoDigits!!"),
            Err(PasswordError::MissingDigit)
        );
        assert_eq!(
            validate_password("NoSpecial123"),
            Err(PasswordError::MissingSpecial)
        );
    }

    #[test]
    fn test_symbols_count_as_special() {
        assert_eq!(validate_password("Abcdefg1€"), Ok(()));
        assert_eq!(validate_password("Abcdefg1_"), Ok(()));
    }

    #[test]
    fn test_only_decimal_digits_count() {
        // superscript two and roman numeral eight are numbers, not digits
        assert_eq!(
            validate_password("Abcdefg²!"),
            Err(PasswordError::MissingDigit)
        );
        assert_eq!(
            validate_password("Abcdefg\u{2167}!"),
            Err(PasswordError::MissingDigit)
        );
        assert_eq!(validate_password("Abcdefg\u{0663}!"), Ok(()));
    }

    #[test]
    fn test_combining_mark_is_not_special() {
        assert_eq!(
            validate_password("Abcdefg1\u{301}"),
            Err(PasswordError::MissingSpecial)
        );
    }

    #[test]
    fn test_titlecase_is_not_uppercase() {
        // U+01C5 is titlecase (Lt), neither upper nor lower
        assert_eq!(
            validate_password("\u{01C5}bcdefg1!"),
            Err(PasswordError::MissingUppercase)
        );
    }

    #[test]
    fn test_whitespace_is_not_special() {
        assert_eq!(
            validate_password("Abc defg1"),
            Err(PasswordError::MissingSpecial)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PasswordError::MissingDigit.to_string(),
            "Password must contain at least 1 numeric character (0, 1, 2, ...)"
        );
    }
}
