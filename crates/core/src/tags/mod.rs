//! Tag reconciliation shared by deals and contacts.
//!
//! Reconciliation makes an entity's tag set exactly equal a requested list
//! of names. Names are normalized first, then the current associations are
//! diffed against the resolved tags.

pub mod reconcile;

#[cfg(test)]
mod reconcile_props;

pub use reconcile::{
    MAX_TAG_NAME_LEN, TagPlan, TagValidationError, TaggedEntity, normalize_tag_name,
    normalize_tag_names, plan_reconciliation,
};
