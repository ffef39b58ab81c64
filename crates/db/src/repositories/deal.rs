//! Deal repository for owner-side deal management.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use dealflow_core::access::{OwnerContext, ShareToken};
use dealflow_core::pipeline::{DealPatch, DealStatus as CoreDealStatus, NewDeal};
use dealflow_core::tags::TaggedEntity;
use dealflow_shared::AppError;
use dealflow_shared::types::{ContactId, DealId, PageRequest, PageResponse};

use super::line_item::items_for;
use super::tag::tag_names;
use crate::entities::{
    contacts, deal_contacts, deals, line_items, sea_orm_active_enums::DealStatus,
};

/// Error types for deal operations.
#[derive(Debug, thiserror::Error)]
pub enum DealError {
    /// Deal not found for this owner.
    #[error("Deal not found: {0}")]
    NotFound(Uuid),

    /// A referenced contact is not found for this owner.
    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing deals.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealFilter {
    /// Filter by status.
    pub status: Option<CoreDealStatus>,
}

/// A deal with everything an owner sees on its detail page.
#[derive(Debug, Clone)]
pub struct DealDetails {
    /// The deal.
    pub deal: deals::Model,
    /// Line items in stored order.
    pub line_items: Vec<line_items::Model>,
    /// Tag names, alphabetically.
    pub tags: Vec<String>,
    /// Linked contact ids.
    pub contact_ids: Vec<Uuid>,
}

/// Deal repository.
#[derive(Debug, Clone)]
pub struct DealRepository {
    db: DatabaseConnection,
}

impl DealRepository {
    /// Creates a new deal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a deal with a fresh share token and zero amount, linking the
    /// given contacts.
    ///
    /// # Errors
    ///
    /// Returns `ContactNotFound` if a contact is absent or owned by someone
    /// else.
    pub async fn create(
        &self,
        owner: OwnerContext,
        input: NewDeal,
        contact_ids: &[ContactId],
    ) -> Result<deals::Model, DealError> {
        let txn = self.db.begin().await?;

        let wanted: HashSet<Uuid> = contact_ids.iter().map(|c| c.into_inner()).collect();
        if !wanted.is_empty() {
            let found: HashSet<Uuid> = contacts::Entity::find()
                .filter(contacts::Column::UserId.eq(owner.user_id.into_inner()))
                .filter(contacts::Column::Id.is_in(wanted.iter().copied()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            if let Some(missing) = wanted.difference(&found).next() {
                return Err(DealError::ContactNotFound(*missing));
            }
        }

        let deal = insert_deal(
            &txn,
            owner,
            NewDealRow {
                title: input.title,
                stage: input.stage,
                status: input.status,
                probability: input.probability.value(),
                amount: Decimal::ZERO,
                close_date: input.close_date,
            },
        )
        .await?;

        for contact_id in wanted {
            link_contact(&txn, deal.id, contact_id).await?;
        }

        txn.commit().await?;

        info!(deal_id = %deal.id, user_id = %owner.user_id, "Created deal");
        Ok(deal)
    }

    /// Lists the owner's deals, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: OwnerContext,
        filter: DealFilter,
        page: PageRequest,
    ) -> Result<PageResponse<deals::Model>, DbErr> {
        let page = page.clamped();

        let mut query =
            deals::Entity::find().filter(deals::Column::UserId.eq(owner.user_id.into_inner()));
        if let Some(status) = filter.status {
            query = query.filter(deals::Column::Status.eq(DealStatus::from(status)));
        }

        let paginator = query
            .order_by_desc(deals::Column::CreatedAt)
            .order_by_desc(deals::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Finds one of the owner's deals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        owner: OwnerContext,
        deal_id: DealId,
    ) -> Result<Option<deals::Model>, DbErr> {
        find_owned(&self.db, owner, deal_id).await
    }

    /// Loads a deal with its line items, tags and contacts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the deal is absent or owned by someone else.
    pub async fn details(
        &self,
        owner: OwnerContext,
        deal_id: DealId,
    ) -> Result<DealDetails, DealError> {
        let deal = find_owned(&self.db, owner, deal_id)
            .await?
            .ok_or(DealError::NotFound(deal_id.into_inner()))?;

        let line_items = items_for(&self.db, deal.id).await?;
        let tags = tag_names(&self.db, TaggedEntity::Deal(deal_id)).await?;
        let contact_ids = deal_contacts::Entity::find()
            .filter(deal_contacts::Column::DealId.eq(deal.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.contact_id)
            .collect();

        Ok(DealDetails {
            deal,
            line_items,
            tags,
            contact_ids,
        })
    }

    /// Applies an owner edit.
    ///
    /// Only the patched fields are written; amount, share token, view count
    /// and signature are untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the deal is absent or owned by someone else.
    pub async fn update(
        &self,
        owner: OwnerContext,
        deal_id: DealId,
        patch: DealPatch,
    ) -> Result<deals::Model, DealError> {
        let deal = find_owned(&self.db, owner, deal_id)
            .await?
            .ok_or(DealError::NotFound(deal_id.into_inner()))?;

        if patch.is_empty() {
            return Ok(deal);
        }

        let mut active: deals::ActiveModel = deal.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(stage) = patch.stage {
            active.stage = Set(stage);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.into());
        }
        if let Some(probability) = patch.probability {
            active.probability = Set(probability.value());
        }
        if let Some(close_date) = patch.close_date {
            active.close_date = Set(close_date);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(deal_id = %updated.id, "Updated deal");
        Ok(updated)
    }

    /// Deletes a deal.
    ///
    /// Line items and associations go with it; invoices and notes stay with
    /// their deal reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the deal is absent or owned by someone else.
    pub async fn delete(&self, owner: OwnerContext, deal_id: DealId) -> Result<(), DealError> {
        let result = deals::Entity::delete_many()
            .filter(deals::Column::Id.eq(deal_id.into_inner()))
            .filter(deals::Column::UserId.eq(owner.user_id.into_inner()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DealError::NotFound(deal_id.into_inner()));
        }

        info!(deal_id = %deal_id, user_id = %owner.user_id, "Deleted deal");
        Ok(())
    }
}

/// Column values for a new deal row.
pub(crate) struct NewDealRow {
    pub title: String,
    pub stage: String,
    pub status: CoreDealStatus,
    pub probability: i16,
    pub amount: Decimal,
    pub close_date: Option<chrono::NaiveDate>,
}

pub(crate) async fn insert_deal<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerContext,
    row: NewDealRow,
) -> Result<deals::Model, DbErr> {
    let now = Utc::now().into();
    deals::ActiveModel {
        id: Set(DealId::new().into_inner()),
        user_id: Set(owner.user_id.into_inner()),
        title: Set(row.title),
        amount: Set(row.amount),
        stage: Set(row.stage),
        status: Set(row.status.into()),
        probability: Set(row.probability),
        portal_views: Set(0),
        share_token: Set(ShareToken::generate().as_str().to_string()),
        signature: Set(None),
        signed_at: Set(None),
        close_date: Set(row.close_date),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub(crate) async fn link_contact<C: ConnectionTrait>(
    conn: &C,
    deal_id: Uuid,
    contact_id: Uuid,
) -> Result<(), DbErr> {
    deal_contacts::Entity::insert(deal_contacts::ActiveModel {
        deal_id: Set(deal_id),
        contact_id: Set(contact_id),
    })
    .on_conflict(
        OnConflict::columns([deal_contacts::Column::DealId, deal_contacts::Column::ContactId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerContext,
    deal_id: DealId,
) -> Result<Option<deals::Model>, DbErr> {
    deals::Entity::find_by_id(deal_id.into_inner())
        .filter(deals::Column::UserId.eq(owner.user_id.into_inner()))
        .one(conn)
        .await
}

impl From<DealError> for AppError {
    fn from(err: DealError) -> Self {
        match err {
            DealError::NotFound(_) => Self::NotFound("Deal not found".to_string()),
            DealError::ContactNotFound(_) => Self::NotFound("Contact not found".to_string()),
            DealError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
