//! `SeaORM` entity definitions.

pub mod contact_tags;
pub mod contacts;
pub mod deal_contacts;
pub mod deal_tags;
pub mod deals;
pub mod invoices;
pub mod line_items;
pub mod notes;
pub mod products;
pub mod sea_orm_active_enums;
pub mod tags;
pub mod users;
