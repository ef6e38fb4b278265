use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::store::StoreError;
use crate::utils::response::error as error_response;

/// A single rejected input field, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Domain conflicts: the request was well formed but the current state of
/// the data does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("User already RSVPed")]
    AlreadyRsvped,

    #[error("Ticket sold out")]
    SoldOut,

    #[error("Quantity cannot be less than the number of confirmed RSVPs ({confirmed})")]
    QuantityBelowAttendees { confirmed: i64 },

    #[error("A ticket of this type already exists for this event")]
    DuplicateTicketType,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Ticket type still has confirmed RSVPs")]
    TicketInUse,
}

impl Conflict {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Conflict::AlreadyRsvped
            | Conflict::SoldOut
            | Conflict::QuantityBelowAttendees { .. } => StatusCode::BAD_REQUEST,
            Conflict::DuplicateTicketType | Conflict::EmailTaken | Conflict::TicketInUse => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(#[from] Conflict),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{resource} not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(conflict) => conflict.status_code(),
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidFields(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal server error");
            }
            AppError::AuthError(msg) | AppError::Forbidden(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::Conflict(conflict) => {
                debug!(conflict = %conflict, "Request conflicts with current state");
            }
            AppError::ValidationError(_) | AppError::InvalidFields(_) | AppError::NotFound(_) => {
                debug!(error = %self, "Request rejected");
            }
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidFields(fields) => match fields.as_slice() {
                [only] => only.message.clone(),
                _ => "One or more fields are invalid".to_string(),
            },
            AppError::Conflict(conflict) => conflict.to_string(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "Internal server error".to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource) => AppError::not_found(resource),
            StoreError::Conflict(conflict) => AppError::Conflict(conflict),
            StoreError::Database(e) => AppError::DatabaseError(e),
            StoreError::Poisoned => {
                AppError::InternalServerError("in-memory store lock poisoned".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        let public_message = self.public_message();

        // Per-field validation failures are the only details the client sees
        let details = match &self {
            AppError::InvalidFields(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };

        error_response(code, public_message, details, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsvp_conflicts_are_bad_requests() {
        assert_eq!(
            AppError::from(Conflict::SoldOut).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(Conflict::AlreadyRsvped).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(Conflict::DuplicateTicketType).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(Conflict::EmailTaken).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_conflict_messages() {
        assert_eq!(Conflict::SoldOut.to_string(), "Ticket sold out");
        assert_eq!(Conflict::AlreadyRsvped.to_string(), "User already RSVPed");
    }

    #[test]
    fn test_internal_errors_are_not_exposed() {
        let err = AppError::InternalServerError("pool exhausted at 10.0.0.4".to_string());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_single_invalid_field_uses_its_message() {
        let err = AppError::InvalidFields(vec![FieldError::new(
            "date",
            "Date must be a valid future date",
        )]);
        assert_eq!(err.public_message(), "Date must be a valid future date");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err = AppError::from(StoreError::NotFound("Ticket"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Ticket not found");
    }
}
