//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod contacts;
pub mod deals;
pub mod health;
pub mod inquiries;
pub mod invoices;
pub mod me;
pub mod portal;
pub mod products;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Owner routes require a verified identity
    let protected_routes = Router::new()
        .merge(me::routes())
        .merge(deals::routes())
        .merge(contacts::routes())
        .merge(products::routes())
        .merge(invoices::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Portal and inquiry routes are public; the share token or handle scopes them
    Router::new()
        .merge(health::routes())
        .merge(portal::routes())
        .merge(inquiries::routes())
        .merge(protected_routes)
}
