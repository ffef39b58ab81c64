//! Product catalog rules.
//!
//! Products are priced offerings an owner can reference from public
//! inquiries. An inquiry naming a product starts its deal at the unit price.

use rust_decimal::Decimal;
use thiserror::Error;

/// Longest accepted product name, in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Validation errors for a new product.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductValidationError {
    /// Name is blank.
    #[error("Product name is required")]
    EmptyName,

    /// Name too long.
    #[error("Product name must be at most 200 characters")]
    NameTooLong,

    /// Unit price is negative.
    #[error("Unit price must not be negative")]
    NegativePrice,
}

/// A validated product ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Name, trimmed.
    pub name: String,
    /// Description, if non-blank.
    pub description: Option<String>,
    /// Unit price, normalized.
    pub unit_price: Decimal,
}

impl ProductDraft {
    /// Validates a raw product.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn new(
        name: &str,
        description: Option<&str>,
        unit_price: Decimal,
    ) -> Result<Self, ProductValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if name.chars().count() > MAX_PRODUCT_NAME_LEN {
            return Err(ProductValidationError::NameTooLong);
        }
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(ProductValidationError::NegativePrice);
        }

        Ok(Self {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            unit_price: unit_price.normalize(),
        })
    }
}
