//! Business and service catalogue types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BusinessId, ServiceId};

/// A business that owns services and receives bookings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    /// URL-safe unique handle
    pub slug: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Public contact block shown to customers
    pub fn contact(&self) -> BusinessContact {
        BusinessContact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Contact details of a business, safe to show to the public
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A bookable service offered by a business
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: ServiceId,
    pub business_id: BusinessId,
    pub name: String,
    pub description: Option<String>,
    /// Price in cents, always positive
    pub price_cents: i64,
    /// Duration in minutes, always positive
    pub duration_minutes: i32,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Service {
    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Convert a cent amount into a currency amount for display
pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Whether a string is a valid business slug (`^[a-z0-9-]+$`)
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
