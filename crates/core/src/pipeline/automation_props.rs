//! Property-based tests for stage automation.

use chrono::Utc;
use proptest::prelude::*;

use super::automation::{SignatureError, StageAutomation, ViewAction};
use super::types::{DealStatus, Stage};

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Lead),
        Just(Stage::Meeting),
        Just(Stage::Proposal),
        Just(Stage::Negotiation),
        Just(Stage::Won),
        Just(Stage::Lost),
    ]
}

/// Known labels in arbitrary case, or custom labels.
fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_stage(), any::<bool>()).prop_map(|(s, upper)| if upper {
            s.as_str().to_uppercase()
        } else {
            s.as_str().to_string()
        }),
        "[A-Z][a-z]{2,12}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A view never moves a deal backwards.
    #[test]
    fn prop_view_is_forward_only(label in arb_label()) {
        if let ViewAction::Advance { stage, status, .. } = StageAutomation::on_view(&label) {
            let before = Stage::parse(&label);
            prop_assert!(before.is_some_and(|b| b < stage));
            prop_assert_eq!(status, DealStatus::Open);
        }
    }

    /// Viewing twice is the same as viewing once, apart from the counter.
    #[test]
    fn prop_second_view_only_counts(label in arb_label()) {
        let after = match StageAutomation::on_view(&label) {
            ViewAction::Advance { stage, .. } => stage.as_str().to_string(),
            ViewAction::CountOnly => label,
        };
        prop_assert_eq!(StageAutomation::on_view(&after), ViewAction::CountOnly);
    }

    /// A signature only ever moves Proposal to Negotiation.
    #[test]
    fn prop_sign_only_advances_proposal(label in arb_label(), sig in "[a-zA-Z]{1,20}") {
        let action = StageAutomation::on_sign(&label, &sig, Utc::now()).unwrap();
        match Stage::parse(&label) {
            Some(Stage::Proposal) => prop_assert_eq!(action.stage, Some(Stage::Negotiation)),
            _ => prop_assert_eq!(action.stage, None),
        }
        prop_assert_eq!(action.signature, sig);
    }

    /// Blank signatures are rejected at every stage.
    #[test]
    fn prop_blank_signature_rejected(label in arb_label(), blank in "[ \t\n]{0,5}") {
        prop_assert_eq!(
            StageAutomation::on_sign(&label, &blank, Utc::now()),
            Err(SignatureError::Empty)
        );
    }
}
