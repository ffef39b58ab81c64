//! Invoice repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

use dealflow_core::access::OwnerContext;
use dealflow_core::invoice::{InvoiceDraft, generate_invoice_number};
use dealflow_shared::AppError;
use dealflow_shared::types::{DealId, InvoiceId, PageRequest, PageResponse};

use super::is_unique_violation;
use crate::entities::{deals, invoices};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Referenced deal not found for this owner.
    #[error("Deal not found: {0}")]
    DealNotFound(Uuid),

    /// Invoice number collided twice.
    #[error("Could not assign a unique invoice number")]
    NumberConflict,

    /// Items could not be stored.
    #[error("Failed to serialize invoice items: {0}")]
    Items(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice with its amount fixed from the draft.
    ///
    /// The number is generated from the current time plus a random suffix.
    /// On a uniqueness violation one retry is made with a fresh number.
    ///
    /// # Errors
    ///
    /// Returns `DealNotFound` if `deal_id` is not one of the owner's deals
    /// and `NumberConflict` if the retry also collides.
    pub async fn create(
        &self,
        owner: OwnerContext,
        deal_id: Option<DealId>,
        draft: InvoiceDraft,
    ) -> Result<invoices::Model, InvoiceError> {
        self.create_with(owner, deal_id, draft, generate_invoice_number)
            .await
    }

    /// Creates an invoice drawing numbers from `next_number`.
    ///
    /// `next_number` is called once per attempt, so at most twice.
    ///
    /// # Errors
    ///
    /// Same as [`InvoiceRepository::create`].
    pub async fn create_with(
        &self,
        owner: OwnerContext,
        deal_id: Option<DealId>,
        draft: InvoiceDraft,
        mut next_number: impl FnMut(DateTime<Utc>) -> String,
    ) -> Result<invoices::Model, InvoiceError> {
        if let Some(deal_id) = deal_id {
            let owned = deals::Entity::find_by_id(deal_id.into_inner())
                .filter(deals::Column::UserId.eq(owner.user_id.into_inner()))
                .count(&self.db)
                .await?;
            if owned == 0 {
                return Err(InvoiceError::DealNotFound(deal_id.into_inner()));
            }
        }

        let items = serde_json::to_value(&draft.items)?;

        let mut retried = false;
        loop {
            let now = Utc::now();
            let invoice = invoices::ActiveModel {
                id: Set(InvoiceId::new().into_inner()),
                user_id: Set(owner.user_id.into_inner()),
                deal_id: Set(deal_id.map(DealId::into_inner)),
                number: Set(next_number(now)),
                amount: Set(draft.amount),
                status: Set(draft.status.into()),
                issue_date: Set(draft.issue_date),
                due_date: Set(draft.due_date),
                items: Set(items.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };

            match invoice.insert(&self.db).await {
                Ok(created) => {
                    info!(
                        invoice_id = %created.id,
                        number = %created.number,
                        amount = %created.amount,
                        "Created invoice"
                    );
                    return Ok(created);
                }
                Err(e) if is_unique_violation(&e) && !retried => {
                    warn!(error = %e, "Invoice number collision, retrying");
                    retried = true;
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(error = %e, "Invoice number collided again");
                    return Err(InvoiceError::NumberConflict);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Lists the owner's invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: OwnerContext,
        page: PageRequest,
    ) -> Result<PageResponse<invoices::Model>, DbErr> {
        let page = page.clamped();
        let paginator = invoices::Entity::find()
            .filter(invoices::Column::UserId.eq(owner.user_id.into_inner()))
            .order_by_desc(invoices::Column::CreatedAt)
            .order_by_desc(invoices::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Finds one of the owner's invoices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        owner: OwnerContext,
        invoice_id: InvoiceId,
    ) -> Result<Option<invoices::Model>, DbErr> {
        invoices::Entity::find_by_id(invoice_id.into_inner())
            .filter(invoices::Column::UserId.eq(owner.user_id.into_inner()))
            .one(&self.db)
            .await
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::DealNotFound(_) => Self::NotFound("Deal not found".to_string()),
            InvoiceError::NumberConflict => {
                Self::Conflict("Could not assign a unique invoice number".to_string())
            }
            InvoiceError::Items(e) => Self::Internal(e.to_string()),
            InvoiceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
