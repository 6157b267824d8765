//! Error types for the Booking API service.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sparkle_auth_core::AuthError;
use sparkle_booking_core::{BookingError, RateLimitDecision};
use sparkle_types::{ApiError as ErrorBody, ApiResponse};

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("No active business found")]
    BusinessNotFound,

    #[error("{0} method not allowed.")]
    MethodNotAllowed(Method),

    #[error("{message}")]
    RateLimited {
        message: &'static str,
        decision: RateLimitDecision,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    /// Booking errors on routes where a missing business is a plain 404
    pub fn business_lookup(err: BookingError) -> Self {
        match err {
            BookingError::BusinessNotFound => Self::BusinessNotFound,
            other => Self::Booking(other),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BusinessNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Booking(e) => status_from_u16(e.status_code()),
            Self::Auth(e) => status_from_u16(e.status_code()),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BusinessNotFound => "BUSINESS_NOT_FOUND",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) => "SERVER_ERROR",
            Self::Booking(e) => e.error_code(),
            Self::Auth(e) => e.error_code(),
        }
    }

    /// Message shown to the caller; internal failures stay generic
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "An unexpected error occurred".to_string(),
            Self::Booking(e) => match e {
                BookingError::Validation(_) => "Invalid booking data".to_string(),
                BookingError::BusinessNotFound => "No active business found".to_string(),
                BookingError::ServiceNotFound => "Selected service is not available".to_string(),
                BookingError::BookingNotFound => "Booking not found".to_string(),
                BookingError::InvalidStatus(_) => "Invalid or missing status value".to_string(),
                BookingError::DuplicateBooking => "This booking already exists".to_string(),
                BookingError::InvalidReference => {
                    "Invalid business or service reference".to_string()
                }
                BookingError::Database(_) | BookingError::Internal(_) => {
                    "An unexpected error occurred".to_string()
                }
                other => capitalize(&other.to_string()),
            },
            Self::Auth(e) => match e {
                AuthError::Database(_) | AuthError::Configuration(_) | AuthError::Internal(_) => {
                    "An unexpected error occurred".to_string()
                }
                other => capitalize(&other.to_string()),
            },
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Booking(BookingError::Validation(fields)) => serde_json::to_value(fields).ok(),
            Self::Booking(BookingError::InvalidParameter { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            Self::Auth(AuthError::SyncMismatch { reason }) => {
                Some(serde_json::json!({ "reason": reason }))
            }
            _ => None,
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors
        if self.is_internal() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let mut error = ErrorBody::new(code, self.public_message());
        if let Some(details) = self.details() {
            error = error.with_details(details);
        }

        let mut response = (status, Json(ApiResponse::<()>::error(error))).into_response();

        if let Self::RateLimited { decision, .. } = &self {
            apply_rate_limit_headers(&mut response, decision);
            let retry_after = decision.retry_after_secs(chrono::Utc::now());
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Add `X-RateLimit-*` headers describing a limiter decision
pub fn apply_rate_limit_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}

fn status_from_u16(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sparkle_booking_core::FieldError;

    #[test]
    fn test_business_lookup_is_404() {
        let err = ApiError::business_lookup(BookingError::BusinessNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "BUSINESS_NOT_FOUND");

        let passthrough = ApiError::business_lookup(BookingError::BookingNotFound);
        assert_eq!(passthrough.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(passthrough.error_code(), "BOOKING_NOT_FOUND");
    }

    #[test]
    fn test_booking_creation_business_missing_is_400() {
        let err = ApiError::from(BookingError::BusinessNotFound);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_details() {
        let err = ApiError::from(BookingError::Validation(vec![FieldError {
            field: "time".into(),
            message: "Time is required".into(),
        }]));
        let details = err.details().unwrap();
        assert_eq!(details[0]["field"], "time");
        assert_eq!(err.public_message(), "Invalid booking data");
    }

    #[test]
    fn test_internal_messages_are_generic() {
        let err = ApiError::from(AuthError::Database("connection refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("connection"));
    }

    #[test]
    fn test_sync_mismatch_is_409() {
        let err = ApiError::from(AuthError::sync_mismatch("User is inactive or deleted"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "SYNC_MISMATCH");
        assert_eq!(err.details().unwrap()["reason"], "User is inactive or deleted");
    }

    #[test]
    fn test_method_not_allowed_message() {
        let err = ApiError::MethodNotAllowed(Method::PUT);
        assert_eq!(err.to_string(), "PUT method not allowed.");
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("invalid email or password"), "Invalid email or password");
        assert_eq!(capitalize(""), "");
    }
}
