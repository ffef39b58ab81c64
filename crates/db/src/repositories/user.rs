//! User repository: provisioning from identity assertions and profile edits.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use dealflow_shared::types::UserId;
use dealflow_shared::{AppError, IdentityClaims};

use super::is_unique_violation;
use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Handle already belongs to another user.
    #[error("Handle is already taken: {0}")]
    HandleTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Validated profile changes. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Display name.
    pub name: Option<String>,
    /// Public handle, already normalized.
    pub handle: Option<String>,
    /// Payment configuration shown on the portal.
    pub payment_settings: Option<Value>,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Finds a user by the identity service's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
    }

    /// Resolves a verified identity to an internal user, creating it on first
    /// sight.
    ///
    /// Concurrent first requests for the same identity race on the unique
    /// `external_id`; the loser's insert is a no-op and both read the same
    /// row. Existing users are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn provision(&self, claims: &IdentityClaims) -> Result<users::Model, DbErr> {
        if let Some(user) = self.find_by_external_id(claims.external_id()).await? {
            return Ok(user);
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            external_id: Set(claims.external_id().to_string()),
            email: Set(claims.email.trim().to_lowercase()),
            name: Set(claims.display_name()),
            handle: Set(None),
            payment_settings: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = users::Entity::insert(user)
            .on_conflict(
                OnConflict::column(users::Column::ExternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let user = self
            .find_by_external_id(claims.external_id())
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(claims.external_id().to_string()))?;

        if inserted > 0 {
            info!(user_id = %user.id, "Provisioned user from identity assertion");
        }

        Ok(user)
    }

    /// Applies profile changes.
    ///
    /// # Errors
    ///
    /// Returns `HandleTaken` if another user owns the handle.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<users::Model, UserError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.into_inner()))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(handle) = update.handle.clone() {
            active.handle = Set(Some(handle));
        }
        if let Some(settings) = update.payment_settings {
            active.payment_settings = Set(Some(settings));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::HandleTaken(update.handle.unwrap_or_default())
            } else {
                UserError::Database(e)
            }
        })
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound("User not found".to_string()),
            UserError::HandleTaken(handle) => {
                Self::Conflict(format!("Handle '{handle}' is already taken"))
            }
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
