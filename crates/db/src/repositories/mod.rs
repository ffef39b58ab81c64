//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Owner-scoped methods take an `OwnerContext` and filter every query by it;
//! portal methods take a `PortalContext` and resolve the deal by share token.

pub mod contact;
pub mod deal;
pub mod inquiry;
pub mod invoice;
pub mod line_item;
pub mod portal;
pub mod product;
pub mod tag;
pub mod user;

pub use contact::{ContactDetails, ContactError, ContactRepository, CreateContactInput};
pub use deal::{DealDetails, DealError, DealFilter, DealRepository};
pub use inquiry::{InquiryError, InquiryOutcome, InquiryRepository};
pub use invoice::{InvoiceError, InvoiceRepository};
pub use line_item::{LineItemError, LineItemRepository, ReplacedLineItems};
pub use portal::{
    PortalContact, PortalDeal, PortalError, PortalInvoice, PortalLineItem, PortalOwner,
    PortalRepository, PortalView, SignOutcome, ViewOutcome,
};
pub use product::{CreateProductInput, ProductError, ProductRepository};
pub use tag::{TagError, TagRepository};
pub use user::{ProfileUpdate, UserError, UserRepository};

use sea_orm::{DbErr, SqlErr};

/// Returns true if the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
