//! Local request validation.
//!
//! Everything here runs before any remote call; a rejected request never
//! touches the identity provider or the store.

use std::sync::LazyLock;

use quill_core::{ProvisionError, Result};

/// Username validation pattern.
///
/// - Must start with a letter
/// - Followed by 2-63 alphanumeric, underscore, or hyphen characters
static USERNAME_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]{2,63}$")
        .expect("USERNAME_REGEX is a valid regex pattern")
});

/// Email validation pattern (pragmatic, not full RFC 5322).
static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("EMAIL_REGEX is a valid regex pattern")
});

/// Maximum email length (RFC 5321).
const MAX_EMAIL_LENGTH: usize = 254;

/// Validate a username.
///
/// # Errors
///
/// `ValidationFailed` when empty, non-ASCII, or outside the pattern.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(ProvisionError::validation("username is required"));
    }
    if !username.is_ascii() || !USERNAME_REGEX.is_match(username) {
        return Err(ProvisionError::validation(
            "username must start with a letter and contain 3-64 letters, \
             numbers, underscores, or hyphens",
        ));
    }
    Ok(())
}

/// Validate an email address.
///
/// # Errors
///
/// `ValidationFailed` when empty, overlong, or malformed.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(ProvisionError::validation("email is required"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ProvisionError::validation(format!(
            "email must not exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ProvisionError::validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validate an age value against the 1-100 bounds.
///
/// # Errors
///
/// `ValidationFailed` when out of bounds.
pub fn validate_age(age: i32) -> Result<()> {
    if !(1..=100).contains(&age) {
        return Err(ProvisionError::validation(format!(
            "age must be between 1 and 100, got {age}"
        )));
    }
    Ok(())
}

/// Validate an initial password credential.
///
/// # Errors
///
/// `ValidationFailed` when empty.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ProvisionError::validation("password is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        for name in ["john", "john_doe", "alice-smith", "User123", "abc"] {
            assert!(validate_username(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_usernames() {
        for name in ["", "ab", "123user", "user@name", "Ülrich", "_lead"] {
            assert!(validate_username(name).is_err(), "{name} should be invalid");
        }
    }

    #[test]
    fn test_valid_emails() {
        for email in ["alice@example.com", "a.b+tag@sub.example.org"] {
            assert!(validate_email(email).is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "no-at-sign", "a@b", "spaces in@example.com"] {
            assert!(validate_email(email).is_err(), "{email} should be invalid");
        }
    }

    #[test]
    fn test_overlong_email_rejected() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&email).is_err());
    }

    #[test]
    fn test_age_bounds() {
        assert!(validate_age(1).is_ok());
        assert!(validate_age(100).is_ok());
        assert!(validate_age(0).is_err());
        assert!(validate_age(101).is_err());
        assert!(validate_age(-5).is_err());
    }

    #[test]
    fn test_password_required() {
        assert!(validate_password("pw").is_ok());
        assert!(validate_password("").is_err());
    }
}
