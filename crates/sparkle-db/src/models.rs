//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use sparkle_types::{
    Booking, BookingStatus, Business, BusinessId, Identity, Role, Service, ServiceId, UserId,
};

use crate::error::DbError;

/// Business row from the database
#[derive(Debug, Clone, FromRow)]
pub struct BusinessRow {
    pub id: Uuid,
    pub name: String,
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

impl BusinessRow {
    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Self {
            id: BusinessId(row.id),
            name: row.name,
            slug: row.slug,
            email: row.email,
            phone: row.phone,
            address: row.address,
            description: row.description,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Service row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRow {
    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: ServiceId(row.id),
            business_id: BusinessId(row.business_id),
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            duration_minutes: row.duration_minutes,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
        }
    }
}

/// Booking row from the database
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub service_id: Option<Uuid>,
    pub service_name: String,
    pub service_price_cents: i64,
    pub service_duration_minutes: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub duration_minutes: i32,
    pub total_price_cents: i64,
    pub notes: Option<String>,
    pub status: String,
    pub confirmation_code: String,
    pub user_id: Option<Uuid>,
    pub reminder_sent: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: sparkle_types::ParseError| DbError::InvalidData(e.to_string()))?;

        Ok(Self {
            id: row.id.into(),
            business_id: BusinessId(row.business_id),
            service_id: row.service_id.map(ServiceId),
            service_name: row.service_name,
            service_price_cents: row.service_price_cents,
            service_duration_minutes: row.service_duration_minutes,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            duration_minutes: row.duration_minutes,
            total_price_cents: row.total_price_cents,
            notes: row.notes,
            status,
            confirmation_code: row.confirmation_code,
            user_id: row.user_id.map(UserId),
            reminder_sent: row.reminder_sent,
            completed_at: row.completed_at,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Local application user row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub business_id: Option<Uuid>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Get the typed user ID
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Build the authenticated identity for this user
    pub fn to_identity(&self) -> Result<Identity, DbError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e: sparkle_types::ParseError| DbError::InvalidData(e.to_string()))?;
        Ok(Identity {
            user_id: self.user_id(),
            email: self.email.clone(),
            role,
            business_id: self.business_id.map(BusinessId),
        })
    }
}

/// Credential row of the identity store
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Session row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Aggregate booking counters for a business dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct BookingStatsRow {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub revenue_cents: i64,
    pub created_today: i64,
    pub created_this_week: i64,
}
