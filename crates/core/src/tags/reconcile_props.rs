//! Property-based tests for tag reconciliation planning.

use std::collections::HashSet;

use proptest::prelude::*;

use super::reconcile::{normalize_tag_names, plan_reconciliation};

fn apply(current: &[u8], to_add: &[u8], to_remove: &[u8]) -> HashSet<u8> {
    let mut set: HashSet<u8> = current.iter().copied().collect();
    for t in to_remove {
        set.remove(t);
    }
    set.extend(to_add.iter().copied());
    set
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applying the plan yields exactly the desired set.
    #[test]
    fn prop_plan_reaches_desired_set(
        current in prop::collection::hash_set(0u8..32, 0..16),
        desired in prop::collection::vec(0u8..32, 0..16),
    ) {
        let current: Vec<u8> = current.into_iter().collect();
        let plan = plan_reconciliation(&current, &desired);
        let result = apply(&current, &plan.to_add, &plan.to_remove);
        let expected: HashSet<u8> = desired.iter().copied().collect();
        prop_assert_eq!(result, expected);
    }

    /// Reconciling an already reconciled set is a no-op.
    #[test]
    fn prop_plan_idempotent(
        current in prop::collection::hash_set(0u8..32, 0..16),
        desired in prop::collection::vec(0u8..32, 0..16),
    ) {
        let current: Vec<u8> = current.into_iter().collect();
        let plan = plan_reconciliation(&current, &desired);
        let after: Vec<u8> = apply(&current, &plan.to_add, &plan.to_remove).into_iter().collect();
        prop_assert!(plan_reconciliation(&after, &desired).is_noop());
    }

    /// Added and removed tags never overlap and never repeat.
    #[test]
    fn prop_plan_disjoint(
        current in prop::collection::vec(0u8..32, 0..16),
        desired in prop::collection::vec(0u8..32, 0..16),
    ) {
        let plan = plan_reconciliation(&current, &desired);
        let add: HashSet<u8> = plan.to_add.iter().copied().collect();
        let remove: HashSet<u8> = plan.to_remove.iter().copied().collect();
        prop_assert_eq!(add.len(), plan.to_add.len());
        prop_assert_eq!(remove.len(), plan.to_remove.len());
        prop_assert!(add.is_disjoint(&remove));
    }

    /// Normalized names are trimmed, lowercase, non-empty and unique.
    #[test]
    fn prop_normalized_names_are_canonical(raw in prop::collection::vec("[ a-zA-Z]{0,12}", 0..12)) {
        let names = normalize_tag_names(&raw).unwrap();
        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());
        for name in &names {
            prop_assert!(!name.is_empty());
            prop_assert_eq!(name.trim(), name.as_str());
            prop_assert_eq!(name.to_lowercase(), name.clone());
        }
    }
}
