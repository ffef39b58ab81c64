//! Common types used across the application.

pub mod id;
pub mod pagination;

#[cfg(test)]
mod id_tests;
#[cfg(test)]
mod pagination_tests;

pub use id::*;
pub use pagination::{PageMeta, PageRequest, PageResponse};
