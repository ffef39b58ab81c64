//! Owner identity middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use dealflow_core::access::OwnerContext;
use dealflow_db::UserRepository;
use dealflow_shared::IdentityError;
use dealflow_shared::types::UserId;

use crate::AppState;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Middleware that resolves the owner behind an identity assertion.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Verifies it with the identity verifier
/// 3. Finds or creates the matching user
/// 4. Stores an `OwnerContext` in request extensions for handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        );
    };

    let claims = match state.identity.verify(token) {
        Ok(claims) => claims,
        Err(IdentityError::Expired) => {
            return unauthorized("token_expired", "Identity assertion has expired");
        }
        Err(e) => {
            debug!(error = %e, "Rejected identity assertion");
            return unauthorized("invalid_token", "Invalid or malformed identity assertion");
        }
    };

    let users = UserRepository::new((*state.db).clone());
    match users.provision(&claims).await {
        Ok(user) => {
            request
                .extensions_mut()
                .insert(OwnerContext::new(UserId::from_uuid(user.id)));
            next.run(request).await
        }
        Err(e) => {
            error!(error = %e, external_id = %claims.external_id(), "Failed to provision user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// Extractor for the authenticated owner.
///
/// ```ignore
/// async fn handler(auth: AuthOwner) -> impl IntoResponse {
///     let owner = auth.owner();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthOwner(pub OwnerContext);

impl AuthOwner {
    /// Returns the owner context.
    #[must_use]
    pub const fn owner(&self) -> OwnerContext {
        self.0
    }

    /// Returns the owner's user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id
    }
}

impl<S> FromRequestParts<S> for AuthOwner
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OwnerContext>()
            .copied()
            .map(AuthOwner)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("abc"), None);
    }
}
