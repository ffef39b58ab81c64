//! `SeaORM` Entity for tags table.
//!
//! Tags are global, unique by normalized name, and never deleted by
//! reconciliation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deal_tags::Entity")]
    DealTags,
    #[sea_orm(has_many = "super::contact_tags::Entity")]
    ContactTags,
}

impl Related<super::deal_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DealTags.def()
    }
}

impl Related<super::contact_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContactTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
