//! Booking errors

use sparkle_db::DbError;
use sparkle_types::BookingStatus;
use thiserror::Error;

use crate::validation::FieldError;

/// Booking errors
#[derive(Error, Debug)]
pub enum BookingError {
    /// Request failed field validation
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A query parameter could not be parsed
    #[error("invalid {field}: {message}")]
    InvalidParameter {
        field: &'static str,
        message: String,
    },

    /// No active business to book with
    #[error("business not found")]
    BusinessNotFound,

    /// Requested service is missing, inactive or belongs to another business
    #[error("service not found")]
    ServiceNotFound,

    /// Booking is missing, soft-deleted or outside the caller's business
    #[error("booking not found")]
    BookingNotFound,

    /// Caller may not perform this operation
    #[error("unauthorized")]
    Unauthorized,

    /// Unrecognized status value
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Transition rejected by the active transition policy
    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Unique constraint collision on insert
    #[error("duplicate booking")]
    DuplicateBooking,

    /// Foreign key violation on insert
    #[error("invalid reference")]
    InvalidReference,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BusinessNotFound | Self::ServiceNotFound | Self::BookingNotFound
        )
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidStatus(_)
            | Self::BusinessNotFound
            | Self::ServiceNotFound
            | Self::InvalidReference => 400,
            Self::Unauthorized => 401,
            Self::BookingNotFound => 404,
            Self::DuplicateBooking | Self::InvalidTransition { .. } => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidParameter { .. } => "VALIDATION_ERROR",
            Self::BusinessNotFound => "BUSINESS_NOT_FOUND",
            Self::ServiceNotFound => "SERVICE_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateBooking => "DUPLICATE_BOOKING",
            Self::InvalidReference => "INVALID_REFERENCE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "SERVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BookingError::Validation(vec![]).status_code(), 400);
        assert_eq!(BookingError::ServiceNotFound.status_code(), 400);
        assert_eq!(BookingError::BookingNotFound.status_code(), 404);
        assert_eq!(BookingError::Unauthorized.status_code(), 401);
        assert_eq!(BookingError::DuplicateBooking.status_code(), 409);
        assert_eq!(BookingError::Database(DbError::NotFound).status_code(), 500);
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = BookingError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Pending,
        };
        assert_eq!(err.to_string(), "cannot move booking from COMPLETED to PENDING");
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
