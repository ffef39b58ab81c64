//! Identity assertion verification.
//!
//! Assertions are HS256 JWTs signed by the external identity service with a
//! shared secret.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{IdentityClaims, MAX_IDENTITY_FIELD_LEN};
use crate::config::IdentityConfig;

/// Errors that can occur while verifying an identity assertion.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Assertion encoding failed.
    #[error("failed to encode assertion: {0}")]
    EncodingError(String),

    /// Assertion has expired.
    #[error("assertion has expired")]
    Expired,

    /// Assertion is malformed, mis-signed, or for another issuer/audience.
    #[error("invalid assertion: {0}")]
    Invalid(String),
}

/// Verifier for identity assertions.
#[derive(Clone)]
pub struct IdentityVerifier {
    config: IdentityConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl IdentityVerifier {
    /// Creates a new verifier with the given configuration.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Verifies and decodes an assertion.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Expired` if the assertion has expired.
    /// Returns `IdentityError::Invalid` for every other failure, including a
    /// subject or email longer than `MAX_IDENTITY_FIELD_LEN`.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;
        match &self.config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        // A configured issuer or audience must be present in the token.
        let mut required = vec!["exp", "sub"];
        if self.config.issuer.is_some() {
            required.push("iss");
        }
        if self.config.audience.is_some() {
            required.push("aud");
        }
        validation.set_required_spec_claims(required.as_slice());

        let claims = decode::<IdentityClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::Invalid(e.to_string()),
            })?;

        if claims.sub.trim().is_empty() {
            return Err(IdentityError::Invalid("empty subject".to_string()));
        }
        if claims.sub.chars().count() > MAX_IDENTITY_FIELD_LEN
            || claims.email.trim().chars().count() > MAX_IDENTITY_FIELD_LEN
        {
            return Err(IdentityError::Invalid("subject or email too long".to_string()));
        }

        Ok(claims)
    }

    /// Issues an assertion for the given identity.
    ///
    /// The production identity service signs its own assertions; this is
    /// used by tests and local tooling that share the secret.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::EncodingError` if signing fails.
    pub fn issue(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
        ttl: Duration,
    ) -> Result<String, IdentityError> {
        let mut claims = IdentityClaims::new(external_id, email, name, Utc::now() + ttl);
        claims.iss.clone_from(&self.config.issuer);
        claims.aud.clone_from(&self.config.audience);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::EncodingError(e.to_string()))
    }
}
