//! Line item ledger rules.
//!
//! A deal's line items are always replaced as a batch. The batch is coerced
//! and validated here, and its total becomes the deal amount.
//!
//! # Modules
//!
//! - `coerce` - Number coercion for loosely typed client input
//! - `batch` - Batch validation and total computation

pub mod batch;
pub mod coerce;

#[cfg(test)]
mod batch_props;

pub use batch::{
    LineItemBatch, LineItemDraft, LineItemInput, LineItemValidationError,
    MAX_LINE_ITEM_NAME_LEN,
};
pub use coerce::{coerce_decimal, coerce_quantity};
