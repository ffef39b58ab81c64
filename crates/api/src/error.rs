//! API error responses.
//!
//! Every handler failure becomes `{"error": <code>, "message": <text>}` with
//! the status from `AppError`. Database and internal details are logged and
//! replaced with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use dealflow_core::access::AccessError;
use dealflow_core::contact::ContactValidationError;
use dealflow_core::inquiry::InquiryValidationError;
use dealflow_core::invoice::InvoiceValidationError;
use dealflow_core::line_items::LineItemValidationError;
use dealflow_core::pipeline::{DealValidationError, SignatureError};
use dealflow_core::product::ProductValidationError;
use dealflow_core::profile::ProfileValidationError;
use dealflow_core::tags::TagValidationError;
use dealflow_db::repositories::{
    ContactError, DealError, InquiryError, InvoiceError, LineItemError, PortalError,
    ProductError, TagError, UserError,
};
use dealflow_shared::AppError;

/// Handler error carrying the shared taxonomy.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_internal() {
            error!(error = %self.0, "Request failed");
        }

        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.public_message(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            // A malformed token is indistinguishable from an unknown one.
            AccessError::InvalidShareToken => Self(AppError::NotFound("Deal not found".to_string())),
        }
    }
}

macro_rules! repository_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

macro_rules! validation_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self(AppError::Validation(err.to_string()))
                }
            }
        )*
    };
}

repository_errors!(
    ContactError,
    DealError,
    InquiryError,
    InvoiceError,
    LineItemError,
    PortalError,
    ProductError,
    TagError,
    UserError,
);

validation_errors!(
    ContactValidationError,
    DealValidationError,
    InquiryValidationError,
    InvoiceValidationError,
    LineItemValidationError,
    ProductValidationError,
    ProfileValidationError,
    SignatureError,
    TagValidationError,
    validator::ValidationErrors,
);
