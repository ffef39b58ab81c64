//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use dealflow_core::invoice::{InvoiceItemInput, InvoiceStatus, prepare_invoice};
use dealflow_db::InvoiceRepository;
use dealflow_shared::AppError;
use dealflow_shared::types::{DealId, InvoiceId, PageRequest};

use crate::{AppState, error::ApiError, middleware::AuthOwner};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Deal the invoice bills, if any.
    pub deal_id: Option<Uuid>,
    /// Billed items; the amount is derived from them.
    #[serde(default)]
    pub items: Vec<InvoiceItemInput>,
    /// Issue date (default: today).
    pub issue_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Status (default: DRAFT).
    pub status: Option<InvoiceStatus>,
}

/// POST `/invoices` - Create an invoice with a fixed amount.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let issue_date = payload
        .issue_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let draft = prepare_invoice(&payload.items, issue_date, payload.due_date, payload.status)?;

    let invoice = InvoiceRepository::new((*state.db).clone())
        .create(auth.owner(), payload.deal_id.map(DealId::from_uuid), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET `/invoices` - List the owner's invoices, newest first.
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthOwner,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = InvoiceRepository::new((*state.db).clone())
        .list(auth.owner(), page)
        .await?;
    Ok(Json(result))
}

/// GET `/invoices/{invoice_id}` - One of the owner's invoices.
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = InvoiceRepository::new((*state.db).clone())
        .find(auth.owner(), InvoiceId::from_uuid(invoice_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;
    Ok(Json(invoice))
}
