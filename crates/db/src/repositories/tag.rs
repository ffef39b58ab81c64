//! Tag repository: reconciles a deal's or contact's tag set.
//!
//! One transaction per call: lock the owning row, create missing tags
//! duplicate-safely, then apply the set difference to the join table.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use dealflow_core::access::OwnerContext;
use dealflow_core::tags::{TagValidationError, TaggedEntity, normalize_tag_names, plan_reconciliation};
use dealflow_shared::AppError;
use dealflow_shared::types::TagId;

use crate::entities::{contact_tags, contacts, deal_tags, deals, tags};

/// Error types for tag reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// Deal or contact not found for this owner.
    #[error("{} not found: {}", .0.kind(), .0.id())]
    NotFound(TaggedEntity),

    /// A requested name is invalid.
    #[error(transparent)]
    Validation(#[from] TagValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Tag repository.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Makes the entity's tag set exactly equal the requested names.
    ///
    /// Names are trimmed and lowercased; duplicates collapse. Missing tags
    /// are created, extra associations removed. An empty list clears all
    /// associations. Tags themselves are never deleted.
    ///
    /// Returns the resolved tags in request order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entity is absent or owned by someone else.
    pub async fn reconcile(
        &self,
        owner: OwnerContext,
        entity: TaggedEntity,
        names: &[String],
    ) -> Result<Vec<tags::Model>, TagError> {
        let names = normalize_tag_names(names)?;

        let txn = self.db.begin().await?;

        if !lock_owned_entity(&txn, owner, entity).await? {
            return Err(TagError::NotFound(entity));
        }

        let resolved = reconcile_in_txn(&txn, entity, &names).await.map_err(|e| {
            error!(
                error = %e,
                entity_kind = entity.kind(),
                entity_id = %entity.id(),
                "Tag reconciliation failed"
            );
            e
        })?;

        txn.commit().await?;

        info!(
            entity_kind = entity.kind(),
            entity_id = %entity.id(),
            tag_count = resolved.len(),
            "Reconciled tags"
        );

        Ok(resolved)
    }

    /// Lists the names of an entity's tags, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn names_for(&self, entity: TaggedEntity) -> Result<Vec<String>, DbErr> {
        tag_names(&self.db, entity).await
    }
}

/// Locks the deal or contact row if the owner holds it.
async fn lock_owned_entity<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerContext,
    entity: TaggedEntity,
) -> Result<bool, DbErr> {
    let user_id = owner.user_id.into_inner();
    let found = match entity {
        TaggedEntity::Deal(id) => deals::Entity::find_by_id(id.into_inner())
            .filter(deals::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(conn)
            .await?
            .is_some(),
        TaggedEntity::Contact(id) => contacts::Entity::find_by_id(id.into_inner())
            .filter(contacts::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(conn)
            .await?
            .is_some(),
    };
    Ok(found)
}

/// Reconciles inside a caller-owned transaction.
///
/// The caller must already hold the entity's row lock and have normalized
/// `names`.
pub(crate) async fn reconcile_in_txn<C: ConnectionTrait>(
    conn: &C,
    entity: TaggedEntity,
    names: &[String],
) -> Result<Vec<tags::Model>, DbErr> {
    let resolved = resolve_tags(conn, names).await?;
    let desired: Vec<Uuid> = resolved.iter().map(|t| t.id).collect();
    let current = current_tag_ids(conn, entity).await?;

    let plan = plan_reconciliation(&current, &desired);
    if !plan.to_remove.is_empty() {
        remove_associations(conn, entity, plan.to_remove).await?;
    }
    if !plan.to_add.is_empty() {
        add_associations(conn, entity, plan.to_add).await?;
    }

    Ok(resolved)
}

/// Finds or creates tags for normalized names, in input order.
async fn resolve_tags<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<tags::Model>, DbErr> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let candidates = names.iter().map(|name| tags::ActiveModel {
        id: Set(TagId::new().into_inner()),
        name: Set(name.clone()),
        created_at: Set(now.into()),
    });

    // Concurrent creators of the same name both succeed; one insert is a no-op.
    tags::Entity::insert_many(candidates)
        .on_conflict(OnConflict::column(tags::Column::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    let mut by_name: HashMap<String, tags::Model> = tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().cloned()))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect();

    names
        .iter()
        .map(|name| {
            by_name
                .remove(name)
                .ok_or_else(|| DbErr::RecordNotFound(format!("tag '{name}'")))
        })
        .collect()
}

async fn current_tag_ids<C: ConnectionTrait>(
    conn: &C,
    entity: TaggedEntity,
) -> Result<Vec<Uuid>, DbErr> {
    let ids = match entity {
        TaggedEntity::Deal(id) => deal_tags::Entity::find()
            .filter(deal_tags::Column::DealId.eq(id.into_inner()))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| row.tag_id)
            .collect(),
        TaggedEntity::Contact(id) => contact_tags::Entity::find()
            .filter(contact_tags::Column::ContactId.eq(id.into_inner()))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| row.tag_id)
            .collect(),
    };
    Ok(ids)
}

async fn remove_associations<C: ConnectionTrait>(
    conn: &C,
    entity: TaggedEntity,
    tag_ids: Vec<Uuid>,
) -> Result<(), DbErr> {
    match entity {
        TaggedEntity::Deal(id) => {
            deal_tags::Entity::delete_many()
                .filter(deal_tags::Column::DealId.eq(id.into_inner()))
                .filter(deal_tags::Column::TagId.is_in(tag_ids))
                .exec(conn)
                .await?;
        }
        TaggedEntity::Contact(id) => {
            contact_tags::Entity::delete_many()
                .filter(contact_tags::Column::ContactId.eq(id.into_inner()))
                .filter(contact_tags::Column::TagId.is_in(tag_ids))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

async fn add_associations<C: ConnectionTrait>(
    conn: &C,
    entity: TaggedEntity,
    tag_ids: Vec<Uuid>,
) -> Result<(), DbErr> {
    match entity {
        TaggedEntity::Deal(id) => {
            let rows = tag_ids.into_iter().map(|tag_id| deal_tags::ActiveModel {
                deal_id: Set(id.into_inner()),
                tag_id: Set(tag_id),
            });
            deal_tags::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([deal_tags::Column::DealId, deal_tags::Column::TagId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        TaggedEntity::Contact(id) => {
            let rows = tag_ids.into_iter().map(|tag_id| contact_tags::ActiveModel {
                contact_id: Set(id.into_inner()),
                tag_id: Set(tag_id),
            });
            contact_tags::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([
                        contact_tags::Column::ContactId,
                        contact_tags::Column::TagId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
    }
    Ok(())
}

/// Names of an entity's tags, alphabetically.
pub(crate) async fn tag_names<C: ConnectionTrait>(
    conn: &C,
    entity: TaggedEntity,
) -> Result<Vec<String>, DbErr> {
    let query = match entity {
        TaggedEntity::Deal(id) => tags::Entity::find()
            .join(sea_orm::JoinType::InnerJoin, tags::Relation::DealTags.def())
            .filter(deal_tags::Column::DealId.eq(id.into_inner())),
        TaggedEntity::Contact(id) => tags::Entity::find()
            .join(sea_orm::JoinType::InnerJoin, tags::Relation::ContactTags.def())
            .filter(contact_tags::Column::ContactId.eq(id.into_inner())),
    };

    Ok(query
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect())
}

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::NotFound(TaggedEntity::Deal(_)) => Self::NotFound("Deal not found".to_string()),
            TagError::NotFound(TaggedEntity::Contact(_)) => {
                Self::NotFound("Contact not found".to_string())
            }
            TagError::Validation(e) => Self::Validation(e.to_string()),
            TagError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
