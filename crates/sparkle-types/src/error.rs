//! Common error types

use thiserror::Error;

/// Errors raised when parsing wire values into domain enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown booking status
    #[error("invalid booking status: {0}")]
    InvalidStatus(String),

    /// Unknown role
    #[error("invalid role: {0}")]
    InvalidRole(String),
}
