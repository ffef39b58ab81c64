//! Shared types, errors, and configuration for Dealflow.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Identity assertion claims and verification

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;


pub use auth::IdentityClaims;
pub use config::{AppConfig, IdentityConfig};
pub use error::{AppError, AppResult};
pub use jwt::{IdentityError, IdentityVerifier};
