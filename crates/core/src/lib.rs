//! Pipeline domain logic for Dealflow.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Validation, derived values and state transitions live here; the `db`
//! crate applies them inside transactions.
//!
//! # Modules
//!
//! - `access` - Owner vs portal caller contexts and share tokens
//! - `contact` - Contact input rules
//! - `line_items` - Line item coercion, validation and deal totals
//! - `tags` - Tag name normalization and reconciliation planning
//! - `pipeline` - Stages, statuses and portal-driven stage automation
//! - `invoice` - Invoice amount derivation and numbering
//! - `inquiry` - Turning website inquiries into contacts and deals
//! - `product` - Product catalog rules
//! - `profile` - Owner handle and payment configuration rules

pub mod access;
pub mod contact;
pub mod inquiry;
pub mod invoice;
pub mod line_items;
pub mod pipeline;
pub mod product;
pub mod profile;
pub mod tags;
