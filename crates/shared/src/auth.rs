//! Identity assertion claims.
//!
//! The external identity service signs a short-lived JWT per session. The
//! `sub` claim is the service's immutable user id and is the only key used to
//! map an assertion onto an internal user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest subject, email or display name stored for an identity.
pub const MAX_IDENTITY_FIELD_LEN: usize = 255;

/// Claims carried by a verified identity assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: stable external identity id.
    pub sub: String,
    /// Email address known to the identity service.
    pub email: String,
    /// Display name known to the identity service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl IdentityClaims {
    /// Creates new claims for an external identity.
    #[must_use]
    pub fn new(
        external_id: &str,
        email: &str,
        name: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: external_id.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            iss: None,
            aud: None,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the external identity id.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.sub
    }

    /// Returns the name to provision a new user with.
    ///
    /// Falls back to the local part of the email when the identity service
    /// has no display name. Clipped to `MAX_IDENTITY_FIELD_LEN` characters.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or_default(),
        };
        name.chars().take(MAX_IDENTITY_FIELD_LEN).collect()
    }
}
