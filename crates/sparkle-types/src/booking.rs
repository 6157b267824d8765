//! Booking types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{BookingId, BusinessContact, BusinessId, ParseError, ServiceId, UserId};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Newly created, awaiting confirmation
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    /// Customer did not show up
    NoShow,
}

impl BookingStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [BookingStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Whether no further work happens on a booking in this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::InvalidStatus(s.to_string()))
    }
}

/// A stored booking.
///
/// The `service_*` fields are a snapshot taken at creation time and never
/// change afterwards, even if the catalogue entry is edited or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub business_id: BusinessId,
    /// `None` once the referenced service has been removed
    pub service_id: Option<ServiceId>,
    pub service_name: String,
    pub service_price_cents: i64,
    pub service_duration_minutes: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub appointment_date: DateTime<Utc>,
    /// `HH:MM`, 24-hour clock
    pub appointment_time: String,
    pub duration_minutes: i32,
    pub total_price_cents: i64,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub confirmation_code: String,
    pub user_id: Option<UserId>,
    pub reminder_sent: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public-safe projection returned right after a booking is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub id: BookingId,
    pub confirmation_code: String,
    pub customer_name: String,
    pub service_name: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub status: BookingStatus,
    pub business: BusinessContact,
}

/// A booking together with the contact block of its business
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub business: BusinessContact,
}
