//! Tag name normalization and association diffing.

use std::collections::HashSet;
use std::hash::Hash;

use dealflow_shared::types::{ContactId, DealId};
use thiserror::Error;

/// Longest tag name accepted after normalization, in characters.
pub const MAX_TAG_NAME_LEN: usize = 64;

/// Validation errors for requested tag names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagValidationError {
    /// A normalized name exceeds the length limit.
    #[error("Tag name too long: {name}")]
    TooLong {
        /// The offending name.
        name: String,
    },
}

/// The entity whose tag set is being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggedEntity {
    /// A deal.
    Deal(DealId),
    /// A contact.
    Contact(ContactId),
}

impl TaggedEntity {
    /// Returns the entity kind for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Deal(_) => "deal",
            Self::Contact(_) => "contact",
        }
    }

    /// Returns the raw entity id.
    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        match self {
            Self::Deal(id) => id.0,
            Self::Contact(id) => id.0,
        }
    }
}

/// Normalizes a single tag name: trimmed and lowercased.
///
/// Returns `None` for names that are empty after trimming.
#[must_use]
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

/// Normalizes a requested list of names.
///
/// Blank names are dropped and duplicates collapse onto their first
/// occurrence, so `["VIP", " vip ", ""]` becomes `["vip"]`.
///
/// # Errors
///
/// Returns `TooLong` if any normalized name exceeds `MAX_TAG_NAME_LEN`.
pub fn normalize_tag_names<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, TagValidationError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for name in raw.iter().filter_map(|r| normalize_tag_name(r.as_ref())) {
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(TagValidationError::TooLong { name });
        }
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    Ok(names)
}

/// Association changes that turn the current tag set into the desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan<T> {
    /// Tags to associate.
    pub to_add: Vec<T>,
    /// Tags to disassociate.
    pub to_remove: Vec<T>,
}

impl<T> TagPlan<T> {
    /// Returns true if the current set already matches.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Computes the set difference between current and desired tag ids.
///
/// Order follows the input slices. Duplicates in either input are ignored.
#[must_use]
pub fn plan_reconciliation<T>(current: &[T], desired: &[T]) -> TagPlan<T>
where
    T: Copy + Eq + Hash,
{
    let current_set: HashSet<T> = current.iter().copied().collect();
    let desired_set: HashSet<T> = desired.iter().copied().collect();

    let mut added = HashSet::new();
    let to_add = desired
        .iter()
        .copied()
        .filter(|t| !current_set.contains(t) && added.insert(*t))
        .collect();

    let mut removed = HashSet::new();
    let to_remove = current
        .iter()
        .copied()
        .filter(|t| !desired_set.contains(t) && removed.insert(*t))
        .collect();

    TagPlan { to_add, to_remove }
}
