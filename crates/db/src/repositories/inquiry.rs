//! Public inquiry intake.
//!
//! Turns one website inquiry into a contact, a linked lead deal and an
//! optional note, atomically. Nothing is written when the handle does not
//! resolve.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

use dealflow_core::access::OwnerContext;
use dealflow_core::inquiry::{Inquiry, WEBSITE_INQUIRY_TAG};
use dealflow_core::tags::TaggedEntity;
use dealflow_shared::AppError;
use dealflow_shared::types::{ContactId, NoteId, ProductId, UserId};

use super::contact::find_or_create;
use super::deal::{NewDealRow, insert_deal, link_contact};
use super::product::find_owned;
use super::tag::reconcile_in_txn;
use crate::entities::{contacts, deals, notes, users};

/// Error types for inquiry intake.
#[derive(Debug, thiserror::Error)]
pub enum InquiryError {
    /// No owner has this handle.
    #[error("No owner with handle: {0}")]
    OwnerNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Records produced by one inquiry.
#[derive(Debug, Clone)]
pub struct InquiryOutcome {
    /// The new lead deal.
    pub deal: deals::Model,
    /// The matched or created contact.
    pub contact: contacts::Model,
    /// Whether the contact was created by this inquiry.
    pub contact_created: bool,
    /// Note holding the message, if one was sent.
    pub note: Option<notes::Model>,
}

/// Inquiry repository.
#[derive(Debug, Clone)]
pub struct InquiryRepository {
    db: DatabaseConnection,
}

impl InquiryRepository {
    /// Creates a new inquiry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an inquiry addressed to the owner with `handle`.
    ///
    /// A product id that is unknown or belongs to another owner is ignored.
    ///
    /// # Errors
    ///
    /// Returns `OwnerNotFound` if no owner has the handle.
    pub async fn submit(
        &self,
        handle: &str,
        inquiry: Inquiry,
        product_id: Option<ProductId>,
    ) -> Result<InquiryOutcome, InquiryError> {
        let handle = handle.trim().to_lowercase();

        let txn = self.db.begin().await?;

        let owner = users::Entity::find()
            .filter(users::Column::Handle.eq(handle.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| InquiryError::OwnerNotFound(handle.clone()))?;
        let user_id = UserId::from_uuid(owner.id);

        let (contact, contact_created) =
            find_or_create(&txn, user_id, &inquiry.name, &inquiry.email).await?;
        if contact_created {
            reconcile_in_txn(
                &txn,
                TaggedEntity::Contact(ContactId::from_uuid(contact.id)),
                &[WEBSITE_INQUIRY_TAG.to_string()],
            )
            .await?;
        }

        let product = match product_id {
            Some(product_id) => find_owned(&txn, user_id, product_id).await?,
            None => None,
        };
        let planned = inquiry.deal(product.as_ref().map(|p| (p.name.as_str(), p.unit_price)));

        let deal = insert_deal(
            &txn,
            OwnerContext::new(user_id),
            NewDealRow {
                title: planned.title,
                stage: planned.stage.as_str().to_string(),
                status: planned.status,
                probability: planned.probability.value(),
                amount: planned.amount,
                close_date: None,
            },
        )
        .await?;
        link_contact(&txn, deal.id, contact.id).await?;

        let note = match &inquiry.message {
            Some(message) => Some(
                notes::ActiveModel {
                    id: Set(NoteId::new().into_inner()),
                    user_id: Set(owner.id),
                    deal_id: Set(Some(deal.id)),
                    contact_id: Set(Some(contact.id)),
                    body: Set(message.clone()),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await?,
            ),
            None => None,
        };

        txn.commit().await?;

        info!(
            user_id = %owner.id,
            deal_id = %deal.id,
            contact_id = %contact.id,
            contact_created,
            "Recorded inquiry"
        );

        Ok(InquiryOutcome {
            deal,
            contact,
            contact_created,
            note,
        })
    }
}

impl From<InquiryError> for AppError {
    fn from(err: InquiryError) -> Self {
        match err {
            InquiryError::OwnerNotFound(_) => Self::NotFound("Owner not found".to_string()),
            InquiryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
