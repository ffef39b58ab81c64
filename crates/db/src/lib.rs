//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every multi-step write runs inside one database transaction. Writers on
//! the same deal or contact serialize on that row's lock.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    ContactRepository, DealRepository, InquiryRepository, InvoiceRepository,
    LineItemRepository, PortalRepository, ProductRepository, TagRepository, UserRepository,
};

use std::time::Duration;

use dealflow_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool using the configured limits and timeouts.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options).await
}
