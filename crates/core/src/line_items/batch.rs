//! Line item batch validation and totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::coerce::{coerce_decimal, coerce_quantity};

/// Longest accepted line item name, in characters.
pub const MAX_LINE_ITEM_NAME_LEN: usize = 255;

/// Validation errors for a line item batch.
///
/// Every variant carries the zero-based position of the offending item.
/// Any error rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemValidationError {
    /// Item has no name.
    #[error("Line item {index}: name is required")]
    MissingName {
        /// Position in the batch.
        index: usize,
    },

    /// Item name is longer than `MAX_LINE_ITEM_NAME_LEN`.
    #[error("Line item {index}: name must be at most 255 characters")]
    NameTooLong {
        /// Position in the batch.
        index: usize,
    },

    /// Quantity is not a whole number.
    #[error("Line item {index}: quantity must be a whole number")]
    InvalidQuantity {
        /// Position in the batch.
        index: usize,
    },

    /// Price is not numeric.
    #[error("Line item {index}: price must be a number")]
    InvalidPrice {
        /// Position in the batch.
        index: usize,
    },

    /// Quantity is below zero.
    #[error("Line item {index}: quantity must not be negative")]
    NegativeQuantity {
        /// Position in the batch.
        index: usize,
    },

    /// Price is below zero.
    #[error("Line item {index}: price must not be negative")]
    NegativePrice {
        /// Position in the batch.
        index: usize,
    },

    /// The total does not fit in a decimal.
    #[error("Line item total overflowed")]
    Overflow,
}

/// A line item as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Item name.
    #[serde(default)]
    pub name: String,
    /// Optional description, stored as "" when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Quantity as a JSON number or numeric string.
    #[serde(default)]
    pub quantity: Value,
    /// Unit price as a JSON number or numeric string.
    #[serde(default)]
    pub price: Value,
}

/// A validated line item ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDraft {
    /// Item name.
    pub name: String,
    /// Description, never null.
    pub description: String,
    /// Whole-number quantity, at least zero.
    pub quantity: i32,
    /// Unit price, at least zero.
    pub price: Decimal,
}

impl LineItemDraft {
    /// Returns `price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A validated replacement batch and its total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemBatch {
    items: Vec<LineItemDraft>,
    total: Decimal,
}

impl LineItemBatch {
    /// Validates client input and computes the total.
    ///
    /// The order of `inputs` is preserved. An empty slice yields an empty
    /// batch with a zero total.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn prepare(inputs: &[LineItemInput]) -> Result<Self, LineItemValidationError> {
        let items = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| validate_item(index, input))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_drafts(items)
    }

    /// Builds a batch from already validated drafts.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the total cannot be represented.
    pub fn from_drafts(items: Vec<LineItemDraft>) -> Result<Self, LineItemValidationError> {
        let total = compute_total(&items)?;
        Ok(Self { items, total })
    }

    /// Sum of `price * quantity` over all items.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// The validated items in submission order.
    #[must_use]
    pub fn items(&self) -> &[LineItemDraft] {
        &self.items
    }

    /// Returns true if the batch clears all items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the batch, returning items and total.
    #[must_use]
    pub fn into_parts(self) -> (Vec<LineItemDraft>, Decimal) {
        (self.items, self.total)
    }
}

/// Computes `Σ(price * quantity)` with overflow checking.
///
/// # Errors
///
/// Returns `Overflow` if any product or the running sum overflows.
pub fn compute_total(items: &[LineItemDraft]) -> Result<Decimal, LineItemValidationError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.subtotal()
            .and_then(|sub| acc.checked_add(sub))
            .ok_or(LineItemValidationError::Overflow)
    })
}

fn validate_item(
    index: usize,
    input: &LineItemInput,
) -> Result<LineItemDraft, LineItemValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(LineItemValidationError::MissingName { index });
    }
    if name.chars().count() > MAX_LINE_ITEM_NAME_LEN {
        return Err(LineItemValidationError::NameTooLong { index });
    }

    let quantity = coerce_quantity(&input.quantity)
        .ok_or(LineItemValidationError::InvalidQuantity { index })?;
    if quantity < 0 {
        return Err(LineItemValidationError::NegativeQuantity { index });
    }

    let price =
        coerce_decimal(&input.price).ok_or(LineItemValidationError::InvalidPrice { index })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(LineItemValidationError::NegativePrice { index });
    }

    Ok(LineItemDraft {
        name: name.to_string(),
        description: input.description.clone().unwrap_or_default(),
        quantity,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn input(name: &str, quantity: Value, price: Value) -> LineItemInput {
        LineItemInput {
            name: name.to_string(),
            description: None,
            quantity,
            price,
        }
    }

    #[test]
    fn test_total_of_mixed_inputs() {
        let batch = LineItemBatch::prepare(&[
            input("Design", json!(2), json!("150.00")),
            input("Hosting", json!("12"), json!(9.99)),
        ])
        .unwrap();

        assert_eq!(batch.total(), dec!(419.88));
        assert_eq!(batch.items().len(), 2);
        assert_eq!(batch.items()[1].quantity, 12);
        assert_eq!(batch.items()[0].description, "");
    }

    #[test]
    fn test_empty_batch_has_zero_total() {
        let batch = LineItemBatch::prepare(&[]).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.total(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_quantity_and_price_are_allowed() {
        let batch = LineItemBatch::prepare(&[
            input("Free consult", json!(1), json!(0)),
            input("Placeholder", json!(0), json!(100)),
        ])
        .unwrap();
        assert_eq!(batch.total(), Decimal::ZERO);
    }

    #[test]
    fn test_non_numeric_price_rejects_whole_batch() {
        let result = LineItemBatch::prepare(&[
            input("Design", json!(1), json!(10)),
            input("Oops", json!(1), json!("ten dollars")),
        ]);
        assert_eq!(result, Err(LineItemValidationError::InvalidPrice { index: 1 }));
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let result = LineItemBatch::prepare(&[input("Hours", json!(1.5), json!(10))]);
        assert_eq!(result, Err(LineItemValidationError::InvalidQuantity { index: 0 }));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert_eq!(
            LineItemBatch::prepare(&[input("A", json!(-1), json!(10))]),
            Err(LineItemValidationError::NegativeQuantity { index: 0 })
        );
        assert_eq!(
            LineItemBatch::prepare(&[input("A", json!(1), json!("-0.01"))]),
            Err(LineItemValidationError::NegativePrice { index: 0 })
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(
            LineItemBatch::prepare(&[input("   ", json!(1), json!(1))]),
            Err(LineItemValidationError::MissingName { index: 0 })
        );
    }

    #[test]
    fn test_name_length_limit() {
        let max = "n".repeat(MAX_LINE_ITEM_NAME_LEN);
        assert!(LineItemBatch::prepare(&[input(&max, json!(1), json!(1))]).is_ok());

        let long = "n".repeat(MAX_LINE_ITEM_NAME_LEN + 1);
        assert_eq!(
            LineItemBatch::prepare(&[
                input("Design", json!(1), json!(1)),
                input(&long, json!(1), json!(1)),
            ]),
            Err(LineItemValidationError::NameTooLong { index: 1 })
        );
    }

    #[test]
    fn test_description_kept_verbatim() {
        let mut item = input("Design", json!(1), json!(1));
        item.description = Some("  two rounds of revisions ".to_string());
        let batch = LineItemBatch::prepare(&[item]).unwrap();
        assert_eq!(batch.items()[0].description, "  two rounds of revisions ");
    }

    #[test]
    fn test_overflow_detected() {
        let huge = LineItemDraft {
            name: "Big".to_string(),
            description: String::new(),
            quantity: i32::MAX,
            price: Decimal::MAX,
        };
        assert_eq!(
            LineItemBatch::from_drafts(vec![huge]),
            Err(LineItemValidationError::Overflow)
        );
    }

    #[test]
    fn test_input_deserializes_with_missing_fields() {
        let item: LineItemInput = serde_json::from_value(json!({ "name": "X" })).unwrap();
        assert!(item.quantity.is_null());
        assert!(matches!(
            LineItemBatch::prepare(&[item]),
            Err(LineItemValidationError::InvalidQuantity { index: 0 })
        ));
    }
}
