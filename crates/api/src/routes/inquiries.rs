//! Public inquiry intake route.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use dealflow_core::inquiry::Inquiry;
use dealflow_db::InquiryRepository;
use dealflow_shared::types::ProductId;

use crate::{AppState, error::ApiError};

/// Creates the inquiry routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/inquiries/{handle}", post(submit_inquiry))
}

/// Request body for a website inquiry.
#[derive(Debug, Deserialize, Validate)]
pub struct InquiryRequest {
    /// Requester name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Requester email.
    #[validate(email, length(max = 255))]
    pub email: String,
    /// Free-text message.
    #[validate(length(max = 5000))]
    pub message: Option<String>,
    /// Product the inquiry is about.
    pub product_id: Option<Uuid>,
}

/// Response for an accepted inquiry.
#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    /// The new deal.
    pub deal_id: Uuid,
    /// The matched or created contact.
    pub contact_id: Uuid,
}

/// POST `/inquiries/{handle}` - Turn a website inquiry into a lead.
async fn submit_inquiry(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(payload): Json<InquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let inquiry = Inquiry::new(&payload.name, &payload.email, payload.message.as_deref())?;

    let outcome = InquiryRepository::new((*state.db).clone())
        .submit(&handle, inquiry, payload.product_id.map(ProductId::from_uuid))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InquiryResponse {
            deal_id: outcome.deal.id,
            contact_id: outcome.contact.id,
        }),
    ))
}
