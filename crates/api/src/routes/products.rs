//! Owner product catalog routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Deserialize;
use serde_json::Value;

use dealflow_core::line_items::coerce_decimal;
use dealflow_core::product::ProductDraft;
use dealflow_db::ProductRepository;
use dealflow_shared::AppError;

use crate::{AppState, error::ApiError, middleware::AuthOwner};

/// Creates the product routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/products", get(list_products).post(create_product))
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Unit price as a number or numeric string.
    pub unit_price: Value,
}

/// POST `/products` - Add a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let unit_price = coerce_decimal(&payload.unit_price)
        .ok_or_else(|| AppError::Validation("Unit price must be a number".to_string()))?;
    let draft = ProductDraft::new(&payload.name, payload.description.as_deref(), unit_price)?;

    let product = ProductRepository::new((*state.db).clone())
        .create(auth.owner(), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET `/products` - List the owner's catalog.
async fn list_products(
    State(state): State<AppState>,
    auth: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let products = ProductRepository::new((*state.db).clone())
        .list(auth.owner())
        .await?;
    Ok(Json(serde_json::json!({ "products": products })))
}
