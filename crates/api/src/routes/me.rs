//! Owner profile routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Deserialize;
use serde_json::Value;

use dealflow_core::profile::{normalize_handle, validate_display_name, validate_payment_settings};
use dealflow_db::UserRepository;
use dealflow_db::repositories::ProfileUpdate;
use dealflow_shared::AppError;

use crate::{AppState, error::ApiError, middleware::AuthOwner};

/// Creates the profile routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

/// Request body for updating the profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Display name.
    pub name: Option<String>,
    /// Public handle used by the inquiry form.
    pub handle: Option<String>,
    /// Payment configuration shown on the portal.
    pub payment_settings: Option<Value>,
}

/// GET `/me` - The provisioned user.
async fn get_me(
    State(state): State<AppState>,
    auth: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// PATCH `/me` - Update name, handle or payment configuration.
async fn update_me(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload
        .name
        .as_deref()
        .map(validate_display_name)
        .transpose()?;
    let handle = payload.handle.as_deref().map(normalize_handle).transpose()?;
    if let Some(settings) = &payload.payment_settings {
        validate_payment_settings(settings)?;
    }

    let user = UserRepository::new((*state.db).clone())
        .update_profile(
            auth.user_id(),
            ProfileUpdate {
                name,
                handle,
                payment_settings: payload.payment_settings,
            },
        )
        .await?;
    Ok(Json(user))
}
