//! Owner deal management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dealflow_core::line_items::{LineItemBatch, LineItemInput};
use dealflow_core::pipeline::{DealStatus, validate_new_deal, validate_patch};
use dealflow_core::tags::TaggedEntity;
use dealflow_db::entities::{deals, line_items};
use dealflow_db::repositories::DealFilter;
use dealflow_db::{DealRepository, LineItemRepository, TagRepository};
use dealflow_shared::AppError;
use dealflow_shared::types::{ContactId, DealId, PageMeta, PageRequest};

use crate::{AppState, error::ApiError, middleware::AuthOwner};

/// Creates the deal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals", get(list_deals).post(create_deal))
        .route(
            "/deals/{deal_id}",
            get(get_deal).patch(update_deal).delete(delete_deal),
        )
        .route("/deals/{deal_id}/line-items", put(replace_line_items))
        .route("/deals/{deal_id}/tags", put(replace_tags))
}

/// Query parameters for listing deals.
#[derive(Debug, Deserialize)]
pub struct ListDealsQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Request body for creating a deal.
#[derive(Debug, Deserialize)]
pub struct CreateDealRequest {
    /// Deal title.
    pub title: String,
    /// Stage label (default: Lead).
    pub stage: Option<String>,
    /// Status (default: PENDING).
    pub status: Option<DealStatus>,
    /// Win probability 0-100 (default: 10).
    pub probability: Option<i32>,
    /// Expected close date.
    pub close_date: Option<NaiveDate>,
    /// Contacts to link.
    #[serde(default)]
    pub contact_ids: Vec<Uuid>,
}

/// Request body for editing a deal.
#[derive(Debug, Deserialize)]
pub struct UpdateDealRequest {
    /// New title.
    pub title: Option<String>,
    /// New stage label.
    pub stage: Option<String>,
    /// New status.
    pub status: Option<DealStatus>,
    /// New probability.
    pub probability: Option<i32>,
    /// New close date; `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub close_date: Option<Option<NaiveDate>>,
}

/// Request body for replacing line items.
#[derive(Debug, Deserialize)]
pub struct ReplaceLineItemsRequest {
    /// The complete new item list.
    pub items: Vec<LineItemInput>,
}

/// Request body for replacing tags.
#[derive(Debug, Deserialize)]
pub struct ReplaceTagsRequest {
    /// The complete new tag name list.
    pub tags: Vec<String>,
}

/// Response for a deal.
#[derive(Debug, Serialize)]
pub struct DealResponse {
    /// Deal ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Amount, the sum of line item subtotals.
    pub amount: Decimal,
    /// Stage label.
    pub stage: String,
    /// Status.
    pub status: DealStatus,
    /// Win probability.
    pub probability: i16,
    /// Portal view count.
    pub portal_views: i32,
    /// Portal share token.
    pub share_token: String,
    /// Client signature.
    pub signature: Option<String>,
    /// When the client signed.
    pub signed_at: Option<String>,
    /// Expected close date.
    pub close_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<deals::Model> for DealResponse {
    fn from(deal: deals::Model) -> Self {
        Self {
            id: deal.id,
            title: deal.title,
            amount: deal.amount,
            stage: deal.stage,
            status: deal.status.into(),
            probability: deal.probability,
            portal_views: deal.portal_views,
            share_token: deal.share_token,
            signature: deal.signature,
            signed_at: deal.signed_at.map(|t| t.to_rfc3339()),
            close_date: deal.close_date,
            created_at: deal.created_at.to_rfc3339(),
            updated_at: deal.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a line item.
#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Quantity.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
}

impl From<line_items::Model> for LineItemResponse {
    fn from(item: line_items::Model) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Paginated deal list.
#[derive(Debug, Serialize)]
pub struct DealListResponse {
    /// Deals on this page.
    pub data: Vec<DealResponse>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// GET `/deals` - List the owner's deals.
async fn list_deals(
    State(state): State<AppState>,
    auth: AuthOwner,
    Query(query): Query<ListDealsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(DealStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid status '{raw}'. Must be one of: PENDING, OPEN, WON, LOST"
            ))
        })?),
        None => None,
    };

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let result = DealRepository::new((*state.db).clone())
        .list(auth.owner(), DealFilter { status }, page)
        .await?;

    Ok(Json(DealListResponse {
        data: result.data.into_iter().map(DealResponse::from).collect(),
        meta: result.meta,
    }))
}

/// POST `/deals` - Create a deal.
async fn create_deal(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(payload): Json<CreateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validate_new_deal(
        &payload.title,
        payload.stage.as_deref(),
        payload.status,
        payload.probability,
        payload.close_date,
    )?;
    let contact_ids: Vec<ContactId> = payload
        .contact_ids
        .into_iter()
        .map(ContactId::from_uuid)
        .collect();

    let deal = DealRepository::new((*state.db).clone())
        .create(auth.owner(), input, &contact_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(DealResponse::from(deal))))
}

/// GET `/deals/{deal_id}` - Deal with line items, tags and contacts.
async fn get_deal(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(deal_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = DealRepository::new((*state.db).clone())
        .details(auth.owner(), DealId::from_uuid(deal_id))
        .await?;

    let line_items: Vec<LineItemResponse> = details
        .line_items
        .into_iter()
        .map(LineItemResponse::from)
        .collect();

    Ok(Json(serde_json::json!({
        "deal": DealResponse::from(details.deal),
        "line_items": line_items,
        "tags": details.tags,
        "contact_ids": details.contact_ids,
    })))
}

/// PATCH `/deals/{deal_id}` - Owner edit.
async fn update_deal(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(deal_id): Path<Uuid>,
    Json(payload): Json<UpdateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = validate_patch(
        payload.title.as_deref(),
        payload.stage.as_deref(),
        payload.status,
        payload.probability,
        payload.close_date,
    )?;

    let deal = DealRepository::new((*state.db).clone())
        .update(auth.owner(), DealId::from_uuid(deal_id), patch)
        .await?;

    Ok(Json(DealResponse::from(deal)))
}

/// DELETE `/deals/{deal_id}` - Delete a deal.
async fn delete_deal(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(deal_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    DealRepository::new((*state.db).clone())
        .delete(auth.owner(), DealId::from_uuid(deal_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/deals/{deal_id}/line-items` - Replace all line items.
async fn replace_line_items(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(deal_id): Path<Uuid>,
    Json(payload): Json<ReplaceLineItemsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = LineItemBatch::prepare(&payload.items)?;

    let replaced = LineItemRepository::new((*state.db).clone())
        .replace(auth.owner(), DealId::from_uuid(deal_id), batch)
        .await?;

    let items: Vec<LineItemResponse> = replaced
        .items
        .into_iter()
        .map(LineItemResponse::from)
        .collect();

    Ok(Json(serde_json::json!({
        "amount": replaced.total,
        "items": items,
    })))
}

/// PUT `/deals/{deal_id}/tags` - Replace the deal's tag set.
async fn replace_tags(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(deal_id): Path<Uuid>,
    Json(payload): Json<ReplaceTagsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = TagRepository::new((*state.db).clone())
        .reconcile(
            auth.owner(),
            TaggedEntity::Deal(DealId::from_uuid(deal_id)),
            &payload.tags,
        )
        .await?;

    let names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
    Ok(Json(serde_json::json!({ "tags": names })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_close_date_absent_null_and_set() {
        let absent: UpdateDealRequest = serde_json::from_value(json!({ "title": "X" })).unwrap();
        assert_eq!(absent.close_date, None);

        let cleared: UpdateDealRequest =
            serde_json::from_value(json!({ "close_date": null })).unwrap();
        assert_eq!(cleared.close_date, Some(None));

        let set: UpdateDealRequest =
            serde_json::from_value(json!({ "close_date": "2026-12-31" })).unwrap();
        assert_eq!(set.close_date, Some(NaiveDate::from_ymd_opt(2026, 12, 31)));
    }
}
