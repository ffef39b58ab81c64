//! Validation for owner-created and owner-edited deals.
//!
//! Owners may set any stage label, including backward moves and Won/Lost.
//! Amount, share token, view count and signature are never owner-editable.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{DealStatus, Probability, ProbabilityError, Stage};

/// Longest accepted deal title.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted stage label.
pub const MAX_STAGE_LEN: usize = 50;

/// Validation errors for deal input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealValidationError {
    /// Title is blank.
    #[error("Title is required")]
    EmptyTitle,

    /// Title is too long.
    #[error("Title must be at most 200 characters")]
    TitleTooLong,

    /// Stage label is blank or too long.
    #[error("Stage must be 1 to 50 characters")]
    InvalidStage,

    /// Probability out of range.
    #[error(transparent)]
    Probability(#[from] ProbabilityError),
}

/// Validated input for a new deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeal {
    /// Deal title.
    pub title: String,
    /// Stage label.
    pub stage: String,
    /// Status.
    pub status: DealStatus,
    /// Win probability.
    pub probability: Probability,
    /// Expected close date.
    pub close_date: Option<NaiveDate>,
}

/// Validated owner edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealPatch {
    /// New title.
    pub title: Option<String>,
    /// New stage label.
    pub stage: Option<String>,
    /// New status.
    pub status: Option<DealStatus>,
    /// New probability.
    pub probability: Option<Probability>,
    /// New close date; `Some(None)` clears it.
    pub close_date: Option<Option<NaiveDate>>,
}

impl DealPatch {
    /// Returns true if nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.stage.is_none()
            && self.status.is_none()
            && self.probability.is_none()
            && self.close_date.is_none()
    }
}

/// Validates a new deal, applying defaults.
///
/// Stage defaults to Lead, status to PENDING and probability to 10.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate_new_deal(
    title: &str,
    stage: Option<&str>,
    status: Option<DealStatus>,
    probability: Option<i32>,
    close_date: Option<NaiveDate>,
) -> Result<NewDeal, DealValidationError> {
    Ok(NewDeal {
        title: validate_title(title)?,
        stage: stage.map_or_else(|| Ok(Stage::Lead.as_str().to_string()), validate_stage)?,
        status: status.unwrap_or_default(),
        probability: probability.map(Probability::new).transpose()?.unwrap_or_default(),
        close_date,
    })
}

/// Validates an owner edit.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate_patch(
    title: Option<&str>,
    stage: Option<&str>,
    status: Option<DealStatus>,
    probability: Option<i32>,
    close_date: Option<Option<NaiveDate>>,
) -> Result<DealPatch, DealValidationError> {
    Ok(DealPatch {
        title: title.map(validate_title).transpose()?,
        stage: stage.map(validate_stage).transpose()?,
        status,
        probability: probability.map(Probability::new).transpose()?,
        close_date,
    })
}

fn validate_title(title: &str) -> Result<String, DealValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DealValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DealValidationError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Known labels are stored in canonical case; custom labels as trimmed.
fn validate_stage(stage: &str) -> Result<String, DealValidationError> {
    let trimmed = stage.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_STAGE_LEN {
        return Err(DealValidationError::InvalidStage);
    }
    Ok(Stage::parse(trimmed).map_or_else(|| trimmed.to_string(), |s| s.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deal_defaults() {
        let deal = validate_new_deal(" Website rebuild ", None, None, None, None).unwrap();
        assert_eq!(deal.title, "Website rebuild");
        assert_eq!(deal.stage, "Lead");
        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(deal.probability.value(), 10);
    }

    #[test]
    fn test_new_deal_canonicalizes_known_stage() {
        let deal = validate_new_deal("X", Some("proposal"), None, Some(50), None).unwrap();
        assert_eq!(deal.stage, "Proposal");
        assert_eq!(deal.probability.value(), 50);
    }

    #[test]
    fn test_new_deal_keeps_custom_stage() {
        let deal = validate_new_deal("X", Some(" Discovery "), None, None, None).unwrap();
        assert_eq!(deal.stage, "Discovery");
    }

    #[test]
    fn test_new_deal_rejects_bad_input() {
        assert_eq!(
            validate_new_deal("  ", None, None, None, None),
            Err(DealValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_new_deal("X", Some(""), None, None, None),
            Err(DealValidationError::InvalidStage)
        );
        assert!(matches!(
            validate_new_deal("X", None, None, Some(101), None),
            Err(DealValidationError::Probability(_))
        ));
        assert_eq!(
            validate_new_deal(&"x".repeat(MAX_TITLE_LEN + 1), None, None, None, None),
            Err(DealValidationError::TitleTooLong)
        );
    }

    #[test]
    fn test_patch_allows_backward_stage() {
        let patch = validate_patch(None, Some("lead"), Some(DealStatus::Lost), None, None).unwrap();
        assert_eq!(patch.stage.as_deref(), Some("Lead"));
        assert_eq!(patch.status, Some(DealStatus::Lost));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        assert!(validate_patch(None, None, None, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_patch_clears_close_date() {
        let patch = validate_patch(None, None, None, None, Some(None)).unwrap();
        assert_eq!(patch.close_date, Some(None));
    }
}
