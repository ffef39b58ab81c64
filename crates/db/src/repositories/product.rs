//! Product repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

use dealflow_core::access::OwnerContext;
use dealflow_core::product::ProductDraft;
use dealflow_shared::AppError;
use dealflow_shared::types::{ProductId, UserId};

use crate::entities::products;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
pub type CreateProductInput = ProductDraft;

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a product to the owner's catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        owner: OwnerContext,
        input: CreateProductInput,
    ) -> Result<products::Model, ProductError> {
        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(ProductId::new().into_inner()),
            user_id: Set(owner.user_id.into_inner()),
            name: Set(input.name),
            description: Set(input.description),
            unit_price: Set(input.unit_price),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        info!(product_id = %product.id, user_id = %owner.user_id, "Created product");
        Ok(product)
    }

    /// Lists the owner's catalog by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner: OwnerContext) -> Result<Vec<products::Model>, DbErr> {
        products::Entity::find()
            .filter(products::Column::UserId.eq(owner.user_id.into_inner()))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await
    }
}

/// Finds a product only if `user_id` owns it.
pub(crate) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<products::Model>, DbErr> {
    products::Entity::find_by_id(product_id.into_inner())
        .filter(products::Column::UserId.eq(user_id.into_inner()))
        .one(conn)
        .await
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
