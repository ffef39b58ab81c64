//! Owner contact routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use dealflow_core::contact::ContactDraft;
use dealflow_core::tags::TaggedEntity;
use dealflow_db::{ContactRepository, TagRepository};
use dealflow_shared::types::{ContactId, PageRequest};

use super::deals::ReplaceTagsRequest;
use crate::{AppState, error::ApiError, middleware::AuthOwner};

/// Creates the contact routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/{contact_id}", get(get_contact))
        .route("/contacts/{contact_id}/tags", put(replace_tags))
}

/// Request body for creating a contact.
#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    /// Name.
    pub name: String,
    /// Email; unique per owner after normalization.
    pub email: String,
    /// Phone.
    pub phone: Option<String>,
    /// Company.
    pub company: Option<String>,
}

/// POST `/contacts` - Create a contact.
async fn create_contact(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = ContactDraft::new(
        &payload.name,
        &payload.email,
        payload.phone.as_deref(),
        payload.company.as_deref(),
    )?;

    let contact = ContactRepository::new((*state.db).clone())
        .create(auth.owner(), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET `/contacts` - List the owner's contacts.
async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthOwner,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = ContactRepository::new((*state.db).clone())
        .list(auth.owner(), page)
        .await?;
    Ok(Json(result))
}

/// GET `/contacts/{contact_id}` - Contact with its tags.
async fn get_contact(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = ContactRepository::new((*state.db).clone())
        .details(auth.owner(), ContactId::from_uuid(contact_id))
        .await?;

    Ok(Json(serde_json::json!({
        "contact": details.contact,
        "tags": details.tags,
    })))
}

/// PUT `/contacts/{contact_id}/tags` - Replace the contact's tag set.
async fn replace_tags(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<ReplaceTagsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = TagRepository::new((*state.db).clone())
        .reconcile(
            auth.owner(),
            TaggedEntity::Contact(ContactId::from_uuid(contact_id)),
            &payload.tags,
        )
        .await?;

    let names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
    Ok(Json(serde_json::json!({ "tags": names })))
}
