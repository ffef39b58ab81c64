//! Caller identity for every deal operation.
//!
//! A request is either made by an authenticated owner, scoped by user id, or
//! through a portal link, scoped by share token. Operations take the specific
//! context they accept so an owner path cannot be reached with a portal token
//! and vice versa.

use dealflow_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shortest share token accepted from a caller.
pub const MIN_SHARE_TOKEN_LEN: usize = 16;
/// Longest share token accepted from a caller.
pub const MAX_SHARE_TOKEN_LEN: usize = 128;

/// Errors resolving a portal caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Share token is missing or malformed.
    #[error("Invalid share token")]
    InvalidShareToken,
}

/// An authenticated owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerContext {
    /// The owner's internal user id.
    pub user_id: UserId,
}

impl OwnerContext {
    /// Creates an owner context.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// A portal visitor holding a deal's share token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalContext {
    /// The presented token.
    pub share_token: ShareToken,
}

impl PortalContext {
    /// Creates a portal context from a raw token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShareToken` if the token is malformed.
    pub fn from_raw(raw: &str) -> Result<Self, AccessError> {
        Ok(Self {
            share_token: ShareToken::parse(raw)?,
        })
    }
}

/// Opaque, URL-safe token granting portal access to one deal.
///
/// Generated once at deal creation and never reissued.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Generates a fresh token from 32 random bytes.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(base64_url::encode(&bytes))
    }

    /// Validates a token presented by a caller.
    ///
    /// Only checks shape; whether it matches a deal is decided by lookup.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShareToken` for empty, oversized or non URL-safe input.
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let valid_len = (MIN_SHARE_TOKEN_LEN..=MAX_SHARE_TOKEN_LEN).contains(&raw.len());
        let valid_chars = raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid_len && valid_chars {
            Ok(Self(raw.to_string()))
        } else {
            Err(AccessError::InvalidShareToken)
        }
    }

    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareToken([hidden])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_is_url_safe_and_parses() {
        let token = ShareToken::generate();
        assert_eq!(token.as_str().len(), 43);
        assert_eq!(ShareToken::parse(token.as_str()).unwrap(), token);
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(ShareToken::generate(), ShareToken::generate());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ShareToken::parse(""), Err(AccessError::InvalidShareToken));
        assert_eq!(ShareToken::parse("short"), Err(AccessError::InvalidShareToken));
        assert_eq!(
            ShareToken::parse("abcdefghijklmnop/../etc"),
            Err(AccessError::InvalidShareToken)
        );
        assert_eq!(
            ShareToken::parse(&"a".repeat(MAX_SHARE_TOKEN_LEN + 1)),
            Err(AccessError::InvalidShareToken)
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let token = ShareToken::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }
}
