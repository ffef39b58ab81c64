//! Line item repository: replaces a deal's items and its derived amount.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use dealflow_core::access::OwnerContext;
use dealflow_core::line_items::LineItemBatch;
use dealflow_shared::AppError;
use dealflow_shared::types::{DealId, LineItemId};

use crate::entities::{deals, line_items};

/// Error types for line item operations.
#[derive(Debug, thiserror::Error)]
pub enum LineItemError {
    /// Deal not found for this owner.
    #[error("Deal not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result of a replacement.
#[derive(Debug, Clone)]
pub struct ReplacedLineItems {
    /// The deal's new amount.
    pub total: Decimal,
    /// The stored items in submission order.
    pub items: Vec<line_items::Model>,
}

/// Line item repository.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    db: DatabaseConnection,
}

impl LineItemRepository {
    /// Creates a new line item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replaces all of a deal's line items and stores the new total.
    ///
    /// Runs as one transaction holding the deal's row lock, so concurrent
    /// replacements on the same deal never interleave: the last committer
    /// wins. The batch is validated by the caller before this is reached.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the deal is absent or owned by someone else.
    pub async fn replace(
        &self,
        owner: OwnerContext,
        deal_id: DealId,
        batch: LineItemBatch,
    ) -> Result<ReplacedLineItems, LineItemError> {
        let result = self.replace_in_txn(owner, deal_id, batch).await;

        match &result {
            Ok(replaced) => info!(
                deal_id = %deal_id,
                user_id = %owner.user_id,
                item_count = replaced.items.len(),
                total = %replaced.total,
                "Replaced line items"
            ),
            Err(LineItemError::Database(e)) => error!(
                error = %e,
                deal_id = %deal_id,
                "Line item replacement rolled back"
            ),
            Err(LineItemError::NotFound(_)) => {}
        }

        result
    }

    async fn replace_in_txn(
        &self,
        owner: OwnerContext,
        deal_id: DealId,
        batch: LineItemBatch,
    ) -> Result<ReplacedLineItems, LineItemError> {
        let txn = self.db.begin().await?;

        let deal = deals::Entity::find_by_id(deal_id.into_inner())
            .filter(deals::Column::UserId.eq(owner.user_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LineItemError::NotFound(deal_id.into_inner()))?;

        line_items::Entity::delete_many()
            .filter(line_items::Column::DealId.eq(deal.id))
            .exec(&txn)
            .await?;

        let (drafts, total) = batch.into_parts();
        let now = Utc::now();

        if !drafts.is_empty() {
            let rows = drafts.into_iter().zip(0i32..).map(|(draft, position)| {
                line_items::ActiveModel {
                    id: Set(LineItemId::new().into_inner()),
                    deal_id: Set(deal.id),
                    name: Set(draft.name),
                    description: Set(draft.description),
                    quantity: Set(draft.quantity),
                    price: Set(draft.price),
                    position: Set(position),
                    created_at: Set(now.into()),
                }
            });
            line_items::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }

        let deal_id = deal.id;
        let mut active: deals::ActiveModel = deal.into();
        active.amount = Set(total);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        let items = items_for(&txn, deal_id).await?;

        txn.commit().await?;

        Ok(ReplacedLineItems { total, items })
    }
}

pub(crate) async fn items_for<C: sea_orm::ConnectionTrait>(
    conn: &C,
    deal_id: Uuid,
) -> Result<Vec<line_items::Model>, DbErr> {
    line_items::Entity::find()
        .filter(line_items::Column::DealId.eq(deal_id))
        .order_by_asc(line_items::Column::Position)
        .all(conn)
        .await
}

impl From<LineItemError> for AppError {
    fn from(err: LineItemError) -> Self {
        match err {
            LineItemError::NotFound(_) => Self::NotFound("Deal not found".to_string()),
            LineItemError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
