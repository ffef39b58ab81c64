//! Deal pipeline: stages, statuses and portal-driven automation.
//!
//! # Modules
//!
//! - `types` - Stage, status and probability types
//! - `automation` - Forward-only reactions to portal view and sign events
//! - `deal` - Validation for owner-created and owner-edited deals

pub mod automation;
pub mod deal;
pub mod types;

#[cfg(test)]
mod automation_props;

pub use automation::{SignAction, SignatureError, StageAutomation, ViewAction};
pub use deal::{DealPatch, DealValidationError, NewDeal, validate_new_deal, validate_patch};
pub use types::{DealStatus, Probability, ProbabilityError, Stage};
