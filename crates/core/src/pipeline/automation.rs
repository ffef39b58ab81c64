//! Stage automation for portal events.
//!
//! Portal events only ever move a deal forward. The functions here decide
//! what should change; the persistence layer applies the result inside the
//! same transaction that holds the deal's row lock.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{DealStatus, Probability, Stage};

/// Errors raised by portal events before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Signature was empty or whitespace.
    #[error("Signature is required")]
    Empty,
}

/// Outcome of a portal view.
///
/// Both variants imply a single `portal_views` increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    /// Advance the deal and count the view.
    Advance {
        /// New stage.
        stage: Stage,
        /// New status.
        status: DealStatus,
        /// New probability.
        probability: Probability,
    },
    /// Only count the view.
    CountOnly,
}

impl ViewAction {
    /// Returns true if the deal's pipeline fields change.
    #[must_use]
    pub const fn advances(&self) -> bool {
        matches!(self, Self::Advance { .. })
    }
}

/// Outcome of a portal signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignAction {
    /// Signature to store, overwriting any previous one.
    pub signature: String,
    /// When the signature was captured.
    pub signed_at: DateTime<Utc>,
    /// New stage, if the signature advances the deal.
    pub stage: Option<Stage>,
}

/// Stateless service for portal-driven stage transitions.
pub struct StageAutomation;

impl StageAutomation {
    /// Decides what a portal view does to a deal at `stage_label`.
    ///
    /// Lead, Meeting and Proposal advance to Negotiation with status OPEN and
    /// probability 80. Every other label, including custom ones, only counts
    /// the view.
    #[must_use]
    pub fn on_view(stage_label: &str) -> ViewAction {
        match Stage::parse(stage_label) {
            Some(stage) if stage.advances_on_view() => ViewAction::Advance {
                stage: Stage::Negotiation,
                status: DealStatus::Open,
                probability: Probability::ENGAGED,
            },
            _ => ViewAction::CountOnly,
        }
    }

    /// Decides what a portal signature does to a deal at `stage_label`.
    ///
    /// The signature is stored as given. Only a deal at Proposal moves, to
    /// Negotiation; status and probability are never touched.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::Empty` if the signature is blank.
    pub fn on_sign(
        stage_label: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<SignAction, SignatureError> {
        Self::check_signature(signature)?;

        let stage = match Stage::parse(stage_label) {
            Some(Stage::Proposal) => Some(Stage::Negotiation),
            _ => None,
        };

        Ok(SignAction {
            signature: signature.to_string(),
            signed_at: now,
            stage,
        })
    }

    /// Rejects a blank signature.
    ///
    /// Called before the deal is loaded so a bad request never touches the
    /// database.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::Empty` if the signature is blank.
    pub fn check_signature(signature: &str) -> Result<(), SignatureError> {
        if signature.trim().is_empty() {
            return Err(SignatureError::Empty);
        }
        Ok(())
    }
}
