//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use dealflow_core::invoice::InvoiceStatus as CoreInvoiceStatus;
use dealflow_core::pipeline::DealStatus as CoreDealStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "deal_status")]
pub enum DealStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "WON")]
    Won,
    #[sea_orm(string_value = "LOST")]
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<CoreDealStatus> for DealStatus {
    fn from(status: CoreDealStatus) -> Self {
        match status {
            CoreDealStatus::Pending => Self::Pending,
            CoreDealStatus::Open => Self::Open,
            CoreDealStatus::Won => Self::Won,
            CoreDealStatus::Lost => Self::Lost,
        }
    }
}

impl From<DealStatus> for CoreDealStatus {
    fn from(status: DealStatus) -> Self {
        match status {
            DealStatus::Pending => Self::Pending,
            DealStatus::Open => Self::Open,
            DealStatus::Won => Self::Won,
            DealStatus::Lost => Self::Lost,
        }
    }
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(status: CoreInvoiceStatus) -> Self {
        match status {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Sent => Self::Sent,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Overdue => Self::Overdue,
            CoreInvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}
