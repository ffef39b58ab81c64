//! Client portal routes.
//!
//! Unauthenticated; the share token in the path is the only credential and
//! the only scope. Failures never carry persistence detail.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use dealflow_core::access::PortalContext;
use dealflow_core::pipeline::StageAutomation;
use dealflow_db::PortalRepository;

use crate::{AppState, error::ApiError};

/// Creates the portal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/portal/{token}", get(get_portal))
        .route("/portal/{token}/view", post(record_view))
        .route("/portal/{token}/sign", post(sign))
}

/// Request body for signing.
#[derive(Debug, Deserialize)]
pub struct SignRequest {
    /// Signature payload.
    #[serde(default)]
    pub signature: String,
}

/// GET `/portal/{token}` - Client projection of a deal.
async fn get_portal(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = PortalContext::from_raw(&token)?;
    let view = PortalRepository::new((*state.db).clone())
        .view(&ctx)
        .await?;
    Ok(Json(view))
}

/// POST `/portal/{token}/view` - Count a view and apply stage automation.
async fn record_view(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = PortalContext::from_raw(&token)?;
    let outcome = PortalRepository::new((*state.db).clone())
        .record_view(&ctx)
        .await?;
    Ok(Json(outcome))
}

/// POST `/portal/{token}/sign` - Record the client's signature.
async fn sign(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    StageAutomation::check_signature(&payload.signature)?;
    let ctx = PortalContext::from_raw(&token)?;

    let outcome = PortalRepository::new((*state.db).clone())
        .sign(&ctx, &payload.signature)
        .await?;
    Ok(Json(outcome))
}
