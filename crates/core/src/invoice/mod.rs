//! Invoice derivation.
//!
//! An invoice's amount is computed once from its submitted items and never
//! recomputed. Each invoice gets a human-readable number built from a
//! high-resolution timestamp and a random disambiguator.

pub mod number;
pub mod types;

pub use number::generate_invoice_number;
pub use types::{
    InvoiceDraft, InvoiceItem, InvoiceItemInput, InvoiceStatus, InvoiceValidationError,
    prepare_invoice,
};
