//! Invoice input, status and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::line_items::{coerce_decimal, coerce_quantity};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Being prepared; hidden from the portal.
    #[default]
    Draft,
    /// Sent to the client.
    Sent,
    /// Paid.
    Paid,
    /// Past due.
    Overdue,
    /// Cancelled.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the invoice may appear on the portal.
    #[must_use]
    pub const fn is_portal_visible(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for invoice input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceValidationError {
    /// Quantity is not a whole number of at least zero.
    #[error("Invoice item {index}: quantity must be a whole number of at least 0")]
    InvalidQuantity {
        /// Position in the item list.
        index: usize,
    },

    /// Price is not a number of at least zero.
    #[error("Invoice item {index}: price must be a number of at least 0")]
    InvalidPrice {
        /// Position in the item list.
        index: usize,
    },

    /// Due date precedes issue date.
    #[error("Due date must not be before issue date")]
    DueBeforeIssue,

    /// The amount does not fit in a decimal.
    #[error("Invoice amount overflowed")]
    Overflow,
}

/// An invoice item as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItemInput {
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Quantity as a JSON number or numeric string.
    #[serde(default)]
    pub quantity: Value,
    /// Unit price as a JSON number or numeric string.
    #[serde(default)]
    pub price: Value,
}

/// A validated invoice item, stored with the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Description, never null.
    pub description: String,
    /// Whole-number quantity.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
}

/// Validated invoice content with its derived amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    /// Items in submission order.
    pub items: Vec<InvoiceItem>,
    /// `Σ(quantity * price)`, fixed at creation.
    pub amount: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Initial status.
    pub status: InvoiceStatus,
}

/// Validates invoice input and derives its amount.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn prepare_invoice(
    items: &[InvoiceItemInput],
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: Option<InvoiceStatus>,
) -> Result<InvoiceDraft, InvoiceValidationError> {
    if due_date.is_some_and(|due| due < issue_date) {
        return Err(InvoiceValidationError::DueBeforeIssue);
    }

    let items = items
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let quantity = coerce_quantity(&input.quantity)
                .filter(|q| *q >= 0)
                .ok_or(InvoiceValidationError::InvalidQuantity { index })?;
            let price = coerce_decimal(&input.price)
                .filter(|p| p.is_zero() || p.is_sign_positive())
                .ok_or(InvoiceValidationError::InvalidPrice { index })?;
            Ok(InvoiceItem {
                description: input.description.clone().unwrap_or_default(),
                quantity,
                price,
            })
        })
        .collect::<Result<Vec<_>, InvoiceValidationError>>()?;

    let amount = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.price
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|sub| acc.checked_add(sub))
            .ok_or(InvoiceValidationError::Overflow)
    })?;

    Ok(InvoiceDraft {
        items,
        amount,
        issue_date,
        due_date,
        status: status.unwrap_or_default(),
    })
}
