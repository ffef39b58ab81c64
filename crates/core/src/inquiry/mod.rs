//! Inbound website inquiries.
//!
//! An inquiry becomes a contact (found or created by email), a deal linked
//! to it and an optional note carrying the message. This module holds the
//! rules for turning the submission into those records.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::contact::MAX_CONTACT_FIELD_LEN;
use crate::pipeline::deal::MAX_TITLE_LEN;
use crate::pipeline::{DealStatus, Probability, Stage};

/// Tag applied to contacts created from an inquiry, already normalized.
pub const WEBSITE_INQUIRY_TAG: &str = "website inquiry";

/// Longest accepted inquiry message, in characters.
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Validation errors for an inquiry submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InquiryValidationError {
    /// Requester name is blank.
    #[error("Name is required")]
    EmptyName,

    /// Requester email is not plausible.
    #[error("A valid email is required")]
    InvalidEmail,

    /// Name or email longer than the contact record allows.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Limit in characters.
        max: usize,
    },

    /// Message too long.
    #[error("Message must be at most 5000 characters")]
    MessageTooLong,
}

/// A validated inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    /// Requester name, trimmed.
    pub name: String,
    /// Requester email, trimmed and lowercased.
    pub email: String,
    /// Message, if non-blank.
    pub message: Option<String>,
}

impl Inquiry {
    /// Validates a raw submission.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn new(name: &str, email: &str, message: Option<&str>) -> Result<Self, InquiryValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InquiryValidationError::EmptyName);
        }
        if name.chars().count() > MAX_CONTACT_FIELD_LEN {
            return Err(InquiryValidationError::TooLong {
                field: "name",
                max: MAX_CONTACT_FIELD_LEN,
            });
        }

        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(InquiryValidationError::InvalidEmail);
        }
        if email.chars().count() > MAX_CONTACT_FIELD_LEN {
            return Err(InquiryValidationError::TooLong {
                field: "email",
                max: MAX_CONTACT_FIELD_LEN,
            });
        }

        let message = message.map(str::trim).filter(|m| !m.is_empty());
        if message.is_some_and(|m| m.chars().count() > MAX_MESSAGE_LEN) {
            return Err(InquiryValidationError::MessageTooLong);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            message: message.map(str::to_string),
        })
    }

    /// Builds the deal an inquiry creates.
    ///
    /// With a resolved product the deal is titled after it and priced at its
    /// unit price; otherwise the amount is zero. The title is clipped to
    /// `MAX_TITLE_LEN` characters.
    #[must_use]
    pub fn deal(&self, product: Option<(&str, Decimal)>) -> InquiryDeal {
        let (mut title, amount) = match product {
            Some((product_name, price)) => {
                (format!("{product_name} inquiry from {}", self.name), price)
            }
            None => (format!("Inquiry from {}", self.name), Decimal::ZERO),
        };
        if let Some((cut, _)) = title.char_indices().nth(MAX_TITLE_LEN) {
            title.truncate(cut);
        }
        InquiryDeal {
            title,
            amount,
            stage: Stage::Lead,
            status: DealStatus::Pending,
            probability: Probability::INQUIRY,
        }
    }
}

/// The deal created for an inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryDeal {
    /// Deal title.
    pub title: String,
    /// Product price or zero.
    pub amount: Decimal,
    /// Initial stage.
    pub stage: Stage,
    /// Initial status.
    pub status: DealStatus,
    /// Initial probability.
    pub probability: Probability,
}

/// Normalizes an email for contact matching: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A cheap structural check; full format validation happens at the edge.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
