//! Contact repository.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use dealflow_core::access::OwnerContext;
use dealflow_core::contact::ContactDraft;
use dealflow_core::tags::TaggedEntity;
use dealflow_shared::AppError;
use dealflow_shared::types::{ContactId, PageRequest, PageResponse, UserId};

use super::is_unique_violation;
use super::tag::tag_names;
use crate::entities::contacts;

/// Error types for contact operations.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// Contact not found for this owner.
    #[error("Contact not found: {0}")]
    NotFound(Uuid),

    /// The owner already has a contact with this email.
    #[error("Contact email already exists: {0}")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a contact.
pub type CreateContactInput = ContactDraft;

/// A contact with its tag names.
#[derive(Debug, Clone)]
pub struct ContactDetails {
    /// The contact.
    pub contact: contacts::Model,
    /// Tag names, alphabetically.
    pub tags: Vec<String>,
}

/// Contact repository.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    db: DatabaseConnection,
}

impl ContactRepository {
    /// Creates a new contact repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a contact.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` if the owner already has a contact with the
    /// same email.
    pub async fn create(
        &self,
        owner: OwnerContext,
        input: CreateContactInput,
    ) -> Result<contacts::Model, ContactError> {
        let now = Utc::now();
        let email = input.email.clone();
        let contact = contacts::ActiveModel {
            id: Set(ContactId::new().into_inner()),
            user_id: Set(owner.user_id.into_inner()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            company: Set(input.company),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = contact.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ContactError::EmailTaken(email)
            } else {
                ContactError::Database(e)
            }
        })?;

        info!(contact_id = %created.id, user_id = %owner.user_id, "Created contact");
        Ok(created)
    }

    /// Lists the owner's contacts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: OwnerContext,
        page: PageRequest,
    ) -> Result<PageResponse<contacts::Model>, DbErr> {
        let page = page.clamped();
        let paginator = contacts::Entity::find()
            .filter(contacts::Column::UserId.eq(owner.user_id.into_inner()))
            .order_by_desc(contacts::Column::CreatedAt)
            .order_by_desc(contacts::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Loads one of the owner's contacts with its tags.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contact is absent or owned by someone else.
    pub async fn details(
        &self,
        owner: OwnerContext,
        contact_id: ContactId,
    ) -> Result<ContactDetails, ContactError> {
        let contact = contacts::Entity::find_by_id(contact_id.into_inner())
            .filter(contacts::Column::UserId.eq(owner.user_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(ContactError::NotFound(contact_id.into_inner()))?;

        let tags = tag_names(&self.db, TaggedEntity::Contact(contact_id)).await?;

        Ok(ContactDetails { contact, tags })
    }
}

/// Finds the owner's contact by normalized email or creates it.
///
/// Concurrent callers with the same email converge on one row. Returns the
/// contact and whether this call created it.
pub(crate) async fn find_or_create<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    name: &str,
    email: &str,
) -> Result<(contacts::Model, bool), DbErr> {
    let now = Utc::now();
    let inserted = contacts::Entity::insert(contacts::ActiveModel {
        id: Set(ContactId::new().into_inner()),
        user_id: Set(user_id.into_inner()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        company: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .on_conflict(
        OnConflict::columns([contacts::Column::UserId, contacts::Column::Email])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let contact = contacts::Entity::find()
        .filter(contacts::Column::UserId.eq(user_id.into_inner()))
        .filter(contacts::Column::Email.eq(email))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("contact {email}")))?;

    Ok((contact, inserted > 0))
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(_) => Self::NotFound("Contact not found".to_string()),
            ContactError::EmailTaken(email) => {
                Self::Conflict(format!("A contact with email {email} already exists"))
            }
            ContactError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
