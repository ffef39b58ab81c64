//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Ownership mismatches are always reported as `NotFound` so callers cannot
/// tell a foreign row from a missing one.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid owner identity on an owner-scoped path.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource absent, or excluded by the owner or share-token filter.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any persistence call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique-constraint violation that was not resolved by a retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A step inside an atomic group failed; the whole group was rolled back.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for failures whose detail must stay server-side.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Returns the message that is safe to send to a client.
    ///
    /// Internal failures collapse to a generic message; everything else
    /// carries its own description.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "An error occurred".to_string(),
            Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}
