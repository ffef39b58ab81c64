//! Pipeline domain types.
//!
//! `stage` and `status` are independent axes. The stage is a free-form label
//! stored as text; the well-known labels parse into `Stage` and drive
//! automation. The status is a closed set.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Well-known pipeline stages, in pipeline order.
///
/// Automation only moves forward through Lead → Meeting → Proposal →
/// Negotiation. Won and Lost are set by owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// First contact.
    Lead,
    /// Meeting scheduled or held.
    Meeting,
    /// Proposal sent.
    Proposal,
    /// Terms under discussion.
    Negotiation,
    /// Closed won.
    Won,
    /// Closed lost.
    Lost,
}

impl Stage {
    /// Returns the label stored on the deal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Meeting => "Meeting",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Parses a stored label, ignoring case and surrounding whitespace.
    ///
    /// Custom labels return `None` and are left alone by automation.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "meeting" => Some(Self::Meeting),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Returns true if a portal view advances a deal at this stage.
    #[must_use]
    pub const fn advances_on_view(&self) -> bool {
        matches!(self, Self::Lead | Self::Meeting | Self::Proposal)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deal status, independent of stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealStatus {
    /// Not yet engaged.
    #[default]
    Pending,
    /// Actively engaged.
    Open,
    /// Closed won.
    Won,
    /// Closed lost.
    Lost,
}

impl DealStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Open => "OPEN",
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    /// Parses a status, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "OPEN" => Some(Self::Open),
            "WON" => Some(Self::Won),
            "LOST" => Some(Self::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an out-of-range probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Probability must be between 0 and 100, got {0}")]
pub struct ProbabilityError(pub i32);

/// Win probability as a whole percentage, 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Probability(i16);

impl Probability {
    /// Probability set when a portal view advances a deal.
    pub const ENGAGED: Self = Self(80);
    /// Probability of a deal created from a website inquiry.
    pub const INQUIRY: Self = Self(20);
    /// Probability of a deal created by its owner without one.
    pub const DEFAULT: Self = Self(10);

    /// Creates a probability, rejecting values outside 0..=100.
    ///
    /// # Errors
    ///
    /// Returns `ProbabilityError` for out-of-range values.
    pub fn new(value: i32) -> Result<Self, ProbabilityError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (0..=100).contains(v))
            .map(Self)
            .ok_or(ProbabilityError(value))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for Probability {
    type Error = ProbabilityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for i32 {
    fn from(p: Probability) -> Self {
        Self::from(p.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Lead", Some(Stage::Lead))]
    #[case("meeting", Some(Stage::Meeting))]
    #[case(" PROPOSAL ", Some(Stage::Proposal))]
    #[case("Negotiation", Some(Stage::Negotiation))]
    #[case("won", Some(Stage::Won))]
    #[case("Discovery", None)]
    #[case("", None)]
    fn test_stage_parse(#[case] label: &str, #[case] expected: Option<Stage>) {
        assert_eq!(Stage::parse(label), expected);
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Lead < Stage::Meeting);
        assert!(Stage::Proposal < Stage::Negotiation);
    }

    #[test]
    fn test_stage_advances_on_view() {
        assert!(Stage::Lead.advances_on_view());
        assert!(Stage::Meeting.advances_on_view());
        assert!(Stage::Proposal.advances_on_view());
        assert!(!Stage::Negotiation.advances_on_view());
        assert!(!Stage::Won.advances_on_view());
        assert!(!Stage::Lost.advances_on_view());
    }

    #[test]
    fn test_status_round_trip_through_label() {
        for status in [DealStatus::Pending, DealStatus::Open, DealStatus::Won, DealStatus::Lost] {
            assert_eq!(DealStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DealStatus::parse("open"), Some(DealStatus::Open));
        assert_eq!(DealStatus::parse("closed"), None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&DealStatus::Open).unwrap(), "\"OPEN\"");
    }

    #[rstest]
    #[case(0, true)]
    #[case(100, true)]
    #[case(55, true)]
    #[case(-1, false)]
    #[case(101, false)]
    #[case(70_000, false)]
    fn test_probability_range(#[case] value: i32, #[case] ok: bool) {
        assert_eq!(Probability::new(value).is_ok(), ok);
    }

    #[test]
    fn test_probability_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Probability>("150").is_err());
        assert_eq!(serde_json::from_str::<Probability>("80").unwrap(), Probability::ENGAGED);
    }
}
