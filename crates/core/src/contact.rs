//! Contact input rules.

use thiserror::Error;

use crate::inquiry::{is_plausible_email, normalize_email};

/// Longest accepted name, email or company, in characters.
pub const MAX_CONTACT_FIELD_LEN: usize = 255;

/// Longest accepted phone number, in characters.
pub const MAX_PHONE_LEN: usize = 50;

/// Validation errors for a new contact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    /// Name is blank.
    #[error("Name is required")]
    EmptyName,

    /// Email is not plausible.
    #[error("A valid email is required")]
    InvalidEmail,

    /// A field exceeds its column length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Limit in characters.
        max: usize,
    },
}

/// A validated contact ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    /// Name, trimmed.
    pub name: String,
    /// Email, trimmed and lowercased. Unique per owner.
    pub email: String,
    /// Phone, if non-blank.
    pub phone: Option<String>,
    /// Company, if non-blank.
    pub company: Option<String>,
}

impl ContactDraft {
    /// Validates a raw contact.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn new(
        name: &str,
        email: &str,
        phone: Option<&str>,
        company: Option<&str>,
    ) -> Result<Self, ContactValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactValidationError::EmptyName);
        }

        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(ContactValidationError::InvalidEmail);
        }

        let phone = non_blank(phone);
        let company = non_blank(company);
        check_len("name", Some(name), MAX_CONTACT_FIELD_LEN)?;
        check_len("email", Some(&email), MAX_CONTACT_FIELD_LEN)?;
        check_len("phone", phone.as_deref(), MAX_PHONE_LEN)?;
        check_len("company", company.as_deref(), MAX_CONTACT_FIELD_LEN)?;

        Ok(Self {
            name: name.to_string(),
            email,
            phone,
            company,
        })
    }
}

fn check_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ContactValidationError> {
    if value.is_some_and(|v| v.chars().count() > max) {
        return Err(ContactValidationError::TooLong { field, max });
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_is_normalized() {
        let draft =
            ContactDraft::new(" Ada ", "ADA@Example.com ", Some(" "), Some(" Analytical ")).unwrap();
        assert_eq!(draft.name, "Ada");
        assert_eq!(draft.email, "ada@example.com");
        assert_eq!(draft.phone, None);
        assert_eq!(draft.company.as_deref(), Some("Analytical"));
    }

    #[test]
    fn test_contact_requires_name_and_email() {
        assert_eq!(
            ContactDraft::new("  ", "a@b.c", None, None),
            Err(ContactValidationError::EmptyName)
        );
        assert_eq!(
            ContactDraft::new("Ada", "ada", None, None),
            Err(ContactValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_contact_field_lengths() {
        let long = "x".repeat(MAX_CONTACT_FIELD_LEN + 1);
        assert_eq!(
            ContactDraft::new(&long, "a@b.c", None, None),
            Err(ContactValidationError::TooLong { field: "name", max: MAX_CONTACT_FIELD_LEN })
        );
        assert_eq!(
            ContactDraft::new("Ada", "a@b.c", Some(&"1".repeat(MAX_PHONE_LEN + 1)), None),
            Err(ContactValidationError::TooLong { field: "phone", max: MAX_PHONE_LEN })
        );
        assert!(ContactDraft::new(&"x".repeat(MAX_CONTACT_FIELD_LEN), "a@b.c", None, None).is_ok());
    }
}
