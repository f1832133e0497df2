//! Error types for Lectern server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::reservation::ReservationStatus;

/// Stable machine-readable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StorageUnavailable = 3,
    NotFound = 4,
    CopyNotAvailable = 5,
    CartFull = 6,
    DuplicateEntry = 7,
    EmptyCart = 8,
    ActiveLimitExceeded = 9,
    DuplicateRequest = 10,
    InvalidTimeslotFormat = 11,
    TimeslotNotHalfHourAligned = 12,
    TimeslotOverlap = 13,
    MissingApprovalTimes = 14,
    InvalidTransition = 15,
    InvalidIdentifier = 16,
    BadValue = 17,
    Conflict = 18,
}

/// Main application error type
///
/// Every failure a lifecycle operation can produce is a dedicated variant;
/// nothing escapes as an untyped error. Infrastructure failures surface as
/// `Database` and always mean the enclosing transaction was rolled back.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Copy {0} is not available")]
    CopyNotAvailable(Uuid),

    #[error("Cart limit reached: maximum {limit} entries allowed")]
    CartFull { limit: usize },

    #[error("Copy {0} is already in the cart")]
    DuplicateEntry(Uuid),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cannot hold more than {limit} reserved or borrowed copies (currently {active}, requested {requested})")]
    ActiveLimitExceeded {
        active: i64,
        requested: usize,
        limit: i64,
    },

    #[error("A pending reservation for copy {0} already exists")]
    DuplicateRequest(Uuid),

    #[error("Invalid timeslot format: '{0}' is not an RFC 3339 timestamp")]
    InvalidTimeslotFormat(String),

    #[error("Timeslot '{0}' is not aligned to a half-hour boundary")]
    TimeslotNotHalfHourAligned(String),

    #[error("Timeslots '{0}' and '{1}' overlap")]
    TimeslotOverlap(String, String),

    #[error("Pickup and return times are required when approving a reservation")]
    MissingApprovalTimes,

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::CopyNotAvailable(_) => ErrorCode::CopyNotAvailable,
            AppError::CartFull { .. } => ErrorCode::CartFull,
            AppError::DuplicateEntry(_) => ErrorCode::DuplicateEntry,
            AppError::EmptyCart => ErrorCode::EmptyCart,
            AppError::ActiveLimitExceeded { .. } => ErrorCode::ActiveLimitExceeded,
            AppError::DuplicateRequest(_) => ErrorCode::DuplicateRequest,
            AppError::InvalidTimeslotFormat(_) => ErrorCode::InvalidTimeslotFormat,
            AppError::TimeslotNotHalfHourAligned(_) => ErrorCode::TimeslotNotHalfHourAligned,
            AppError::TimeslotOverlap(_, _) => ErrorCode::TimeslotOverlap,
            AppError::MissingApprovalTimes => ErrorCode::MissingApprovalTimes,
            AppError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            AppError::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Database(_) => ErrorCode::StorageUnavailable,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CopyNotAvailable(_)
            | AppError::DuplicateEntry(_)
            | AppError::DuplicateRequest(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::CartFull { .. }
            | AppError::EmptyCart
            | AppError::ActiveLimitExceeded { .. }
            | AppError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidTimeslotFormat(_)
            | AppError::TimeslotNotHalfHourAligned(_)
            | AppError::TimeslotOverlap(_, _)
            | AppError::MissingApprovalTimes
            | AppError::InvalidIdentifier(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Storage unavailable".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
