//! Auth errors

use thiserror::Error;

/// Authentication and registration errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or badly signed session token
    #[error("invalid token")]
    InvalidToken,

    /// Session has expired
    #[error("session expired")]
    TokenExpired,

    /// Session has been revoked
    #[error("session revoked")]
    SessionRevoked,

    /// Wrong email or password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// No authenticated caller
    #[error("authentication required")]
    Unauthorized,

    /// Caller is authenticated but lacks the required role
    #[error("insufficient permissions")]
    Forbidden,

    /// The identity store and the local user table disagree
    #[error("account out of sync: {reason}")]
    SyncMismatch { reason: String },

    /// Email already registered
    #[error("email already registered")]
    EmailTaken,

    /// Business slug already in use
    #[error("business slug already in use")]
    SlugTaken,

    /// Registration input rejected
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Build a sync mismatch error
    pub fn sync_mismatch(reason: impl Into<String>) -> Self {
        Self::SyncMismatch {
            reason: reason.into(),
        }
    }

    /// Whether the error only means "this token does not authenticate anyone"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::SessionRevoked
        )
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidToken
            | Self::TokenExpired
            | Self::SessionRevoked
            | Self::InvalidCredentials
            | Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::SyncMismatch { .. } | Self::EmailTaken | Self::SlugTaken => 409,
            Self::Validation(_) => 400,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::SyncMismatch { .. } => "SYNC_MISMATCH",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::SlugTaken => "SLUG_TAKEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sparkle_db::DbError> for AuthError {
    fn from(err: sparkle_db::DbError) -> Self {
        match &err {
            sparkle_db::DbError::UniqueViolation { constraint } if constraint.contains("slug") => {
                Self::SlugTaken
            }
            sparkle_db::DbError::UniqueViolation { constraint } if constraint.contains("email") => {
                Self::EmailTaken
            }
            _ => {
                tracing::error!("Database error: {}", err);
                Self::Database(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkle_db::DbError;

    #[test]
    fn test_unique_violations_map_to_conflicts() {
        let email = AuthError::from(DbError::UniqueViolation {
            constraint: "users_email_key".into(),
        });
        assert!(matches!(email, AuthError::EmailTaken));
        assert_eq!(email.status_code(), 409);

        let slug = AuthError::from(DbError::UniqueViolation {
            constraint: "businesses_slug_key".into(),
        });
        assert!(matches!(slug, AuthError::SlugTaken));
    }

    #[test]
    fn test_other_db_errors_are_internal() {
        let err = AuthError::from(DbError::NotFound);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_sync_mismatch_is_distinct() {
        let err = AuthError::sync_mismatch("User is inactive or deleted");
        assert_eq!(err.error_code(), "SYNC_MISMATCH");
        assert_eq!(err.status_code(), 409);
        assert!(!err.is_unauthenticated());
        assert!(AuthError::SessionRevoked.is_unauthenticated());
    }
}
