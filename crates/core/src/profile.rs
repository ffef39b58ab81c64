//! Owner profile rules: public handle and payment configuration.

use serde_json::Value;
use thiserror::Error;

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 255;

/// Validation errors for profile updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileValidationError {
    /// Handle is not 3 to 50 characters of `[a-z0-9-]`.
    #[error("Handle must be 3 to 50 characters of lowercase letters, digits or '-'")]
    InvalidHandle,

    /// Display name is blank.
    #[error("Name must not be empty")]
    EmptyName,

    /// Display name is longer than `MAX_DISPLAY_NAME_LEN`.
    #[error("Name must be at most 255 characters")]
    NameTooLong,

    /// Payment configuration is not a JSON object.
    #[error("Payment settings must be a JSON object")]
    InvalidPaymentSettings,
}

/// Normalizes and validates a public handle.
///
/// Input is trimmed and lowercased before checking.
///
/// # Errors
///
/// Returns `InvalidHandle` if the result is not 3 to 50 characters of
/// `[a-z0-9-]`.
pub fn normalize_handle(raw: &str) -> Result<String, ProfileValidationError> {
    let handle = raw.trim().to_lowercase();
    let valid = (3..=50).contains(&handle.len())
        && handle
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if valid {
        Ok(handle)
    } else {
        Err(ProfileValidationError::InvalidHandle)
    }
}

/// Validates a display name.
///
/// # Errors
///
/// Returns `EmptyName` if the name is blank, `NameTooLong` past
/// `MAX_DISPLAY_NAME_LEN` characters.
pub fn validate_display_name(raw: &str) -> Result<String, ProfileValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ProfileValidationError::EmptyName);
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ProfileValidationError::NameTooLong);
    }
    Ok(name.to_string())
}

/// Validates payment configuration shown on the portal.
///
/// # Errors
///
/// Returns `InvalidPaymentSettings` unless the value is a JSON object.
pub fn validate_payment_settings(value: &Value) -> Result<(), ProfileValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ProfileValidationError::InvalidPaymentSettings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("ada-studio", Ok("ada-studio".to_string()))]
    #[case("  Ada-Studio ", Ok("ada-studio".to_string()))]
    #[case("a1b", Ok("a1b".to_string()))]
    #[case("ab", Err(ProfileValidationError::InvalidHandle))]
    #[case("ada studio", Err(ProfileValidationError::InvalidHandle))]
    #[case("ada_studio", Err(ProfileValidationError::InvalidHandle))]
    #[case("ådå", Err(ProfileValidationError::InvalidHandle))]
    fn test_normalize_handle(
        #[case] raw: &str,
        #[case] expected: Result<String, ProfileValidationError>,
    ) {
        assert_eq!(normalize_handle(raw), expected);
    }

    #[test]
    fn test_handle_length_limit() {
        assert!(normalize_handle(&"a".repeat(50)).is_ok());
        assert!(normalize_handle(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_payment_settings_must_be_object() {
        assert!(validate_payment_settings(&json!({ "iban": "DE00", "paypal": "ada" })).is_ok());
        assert!(validate_payment_settings(&json!("iban")).is_err());
        assert!(validate_payment_settings(&json!(null)).is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(validate_display_name(" Ada ").unwrap(), "Ada");
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name(&"a".repeat(MAX_DISPLAY_NAME_LEN)).is_ok());
        assert_eq!(
            validate_display_name(&"a".repeat(MAX_DISPLAY_NAME_LEN + 1)),
            Err(ProfileValidationError::NameTooLong)
        );
    }
}
