//! Portal repository: everything reachable with a deal's share token.
//!
//! No owner identity is involved. The deal is resolved by share token alone,
//! and only a restricted projection leaves this module.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use dealflow_core::access::PortalContext;
use dealflow_core::invoice::InvoiceStatus as CoreInvoiceStatus;
use dealflow_core::pipeline::{DealStatus as CoreDealStatus, SignatureError, StageAutomation, ViewAction};
use dealflow_shared::AppError;

use super::line_item::items_for;
use crate::entities::{contacts, deal_contacts, deals, invoices, users};

/// Error types for portal operations.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// No deal carries this share token.
    #[error("Deal not found")]
    NotFound,

    /// Signature rejected.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Deal fields visible on the portal.
#[derive(Debug, Clone, Serialize)]
pub struct PortalDeal {
    /// Deal title.
    pub title: String,
    /// Deal amount.
    pub amount: Decimal,
    /// Stage label.
    pub stage: String,
    /// Status.
    pub status: CoreDealStatus,
    /// Expected close date.
    pub close_date: Option<NaiveDate>,
    /// Captured signature.
    pub signature: Option<String>,
    /// When the signature was captured.
    pub signed_at: Option<DateTime<Utc>>,
}

/// Owner fields visible on the portal.
#[derive(Debug, Clone, Serialize)]
pub struct PortalOwner {
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Payment configuration.
    pub payment_settings: Option<Value>,
}

/// Contact fields visible on the portal.
#[derive(Debug, Clone, Serialize)]
pub struct PortalContact {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Company.
    pub company: Option<String>,
}

/// Line item fields visible on the portal.
#[derive(Debug, Clone, Serialize)]
pub struct PortalLineItem {
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Quantity.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
}

/// Invoice fields visible on the portal. Drafts are never included.
#[derive(Debug, Clone, Serialize)]
pub struct PortalInvoice {
    /// Invoice number.
    pub number: String,
    /// Amount.
    pub amount: Decimal,
    /// Status.
    pub status: CoreInvoiceStatus,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Items as stored at creation.
    pub items: Value,
}

/// Everything a portal visitor can read.
#[derive(Debug, Clone, Serialize)]
pub struct PortalView {
    /// The deal.
    pub deal: PortalDeal,
    /// Its owner.
    pub owner: PortalOwner,
    /// Linked contacts.
    pub contacts: Vec<PortalContact>,
    /// Line items in stored order.
    pub line_items: Vec<PortalLineItem>,
    /// Non-draft invoices, newest first.
    pub invoices: Vec<PortalInvoice>,
}

/// Pipeline state after a view.
#[derive(Debug, Clone, Serialize)]
pub struct ViewOutcome {
    /// Stage label.
    pub stage: String,
    /// Status.
    pub status: CoreDealStatus,
    /// Probability.
    pub probability: i16,
    /// View count including this view.
    pub portal_views: i32,
    /// Whether this view advanced the deal.
    pub advanced: bool,
}

/// Deal state after a signature.
#[derive(Debug, Clone, Serialize)]
pub struct SignOutcome {
    /// Stage label.
    pub stage: String,
    /// When the signature was captured.
    pub signed_at: DateTime<Utc>,
}

/// Portal repository.
#[derive(Debug, Clone)]
pub struct PortalRepository {
    db: DatabaseConnection,
}

impl PortalRepository {
    /// Creates a new portal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the restricted projection of a deal.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no deal carries the token.
    pub async fn view(&self, ctx: &PortalContext) -> Result<PortalView, PortalError> {
        let deal = find_by_token(&self.db, ctx, false)
            .await?
            .ok_or(PortalError::NotFound)?;

        let owner = users::Entity::find_by_id(deal.user_id)
            .one(&self.db)
            .await?
            .ok_or(PortalError::NotFound)?;

        let contacts = contacts::Entity::find()
            .join(sea_orm::JoinType::InnerJoin, contacts::Relation::DealContacts.def())
            .filter(deal_contacts::Column::DealId.eq(deal.id))
            .order_by_asc(contacts::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| PortalContact {
                name: c.name,
                email: c.email,
                company: c.company,
            })
            .collect();

        let line_items = items_for(&self.db, deal.id)
            .await?
            .into_iter()
            .map(|item| PortalLineItem {
                name: item.name,
                description: item.description,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        let invoices = invoices::Entity::find()
            .filter(invoices::Column::DealId.eq(deal.id))
            .order_by_desc(invoices::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|inv| CoreInvoiceStatus::from(inv.status).is_portal_visible())
            .map(|inv| PortalInvoice {
                number: inv.number,
                amount: inv.amount,
                status: inv.status.into(),
                issue_date: inv.issue_date,
                due_date: inv.due_date,
                items: inv.items,
            })
            .collect();

        Ok(PortalView {
            deal: PortalDeal {
                title: deal.title,
                amount: deal.amount,
                stage: deal.stage,
                status: deal.status.into(),
                close_date: deal.close_date,
                signature: deal.signature,
                signed_at: deal.signed_at.map(|t| t.with_timezone(&Utc)),
            },
            owner: PortalOwner {
                name: owner.name,
                email: owner.email,
                payment_settings: owner.payment_settings,
            },
            contacts,
            line_items,
            invoices,
        })
    }

    /// Records a portal view.
    ///
    /// Increments the view count by exactly one in the database and, for
    /// deals at Lead, Meeting or Proposal, moves them to Negotiation with
    /// status OPEN and probability 80, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no deal carries the token.
    pub async fn record_view(&self, ctx: &PortalContext) -> Result<ViewOutcome, PortalError> {
        let txn = self.db.begin().await?;

        let deal = find_by_token(&txn, ctx, true)
            .await?
            .ok_or(PortalError::NotFound)?;
        let deal_id = deal.id;
        let action = StageAutomation::on_view(&deal.stage);

        deals::Entity::update_many()
            .col_expr(
                deals::Column::PortalViews,
                Expr::col(deals::Column::PortalViews).add(1),
            )
            .filter(deals::Column::Id.eq(deal_id))
            .exec(&txn)
            .await?;

        if let ViewAction::Advance {
            stage,
            status,
            probability,
        } = action
        {
            let mut active: deals::ActiveModel = deal.into();
            active.stage = Set(stage.as_str().to_string());
            active.status = Set(status.into());
            active.probability = Set(probability.value());
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        let deal = deals::Entity::find_by_id(deal_id)
            .one(&txn)
            .await?
            .ok_or(PortalError::NotFound)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, deal_id = %deal_id, "Portal view rolled back");
            e
        })?;

        info!(
            deal_id = %deal_id,
            portal_views = deal.portal_views,
            advanced = action.advances(),
            "Recorded portal view"
        );

        Ok(ViewOutcome {
            stage: deal.stage,
            status: deal.status.into(),
            probability: deal.probability,
            portal_views: deal.portal_views,
            advanced: action.advances(),
        })
    }

    /// Records a signature.
    ///
    /// Overwrites any previous signature. A deal at Proposal moves to
    /// Negotiation; status and probability are never touched.
    ///
    /// # Errors
    ///
    /// Returns `Signature` for a blank signature before any lookup, and
    /// `NotFound` if no deal carries the token.
    pub async fn sign(
        &self,
        ctx: &PortalContext,
        signature: &str,
    ) -> Result<SignOutcome, PortalError> {
        StageAutomation::check_signature(signature)?;

        let txn = self.db.begin().await?;

        let deal = find_by_token(&txn, ctx, true)
            .await?
            .ok_or(PortalError::NotFound)?;
        let deal_id = deal.id;

        let action = StageAutomation::on_sign(&deal.stage, signature, Utc::now())?;

        let mut active: deals::ActiveModel = deal.into();
        active.signature = Set(Some(action.signature));
        active.signed_at = Set(Some(action.signed_at.into()));
        if let Some(stage) = action.stage {
            active.stage = Set(stage.as_str().to_string());
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(deal_id = %deal_id, stage = %updated.stage, "Recorded portal signature");

        Ok(SignOutcome {
            stage: updated.stage,
            signed_at: action.signed_at,
        })
    }
}

async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    ctx: &PortalContext,
    lock: bool,
) -> Result<Option<deals::Model>, DbErr> {
    let mut query =
        deals::Entity::find().filter(deals::Column::ShareToken.eq(ctx.share_token.as_str()));
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::NotFound => Self::NotFound("Deal not found".to_string()),
            PortalError::Signature(e) => Self::Validation(e.to_string()),
            PortalError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
