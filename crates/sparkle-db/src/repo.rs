//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

// ============================================================================
// Businesses and services
// ============================================================================

/// Business repository trait
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Find a business by ID (including inactive ones)
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>>;

    /// The first active, non-deleted business by creation order
    async fn find_first_active(&self) -> DbResult<Option<BusinessRow>>;

    /// Find an active, non-deleted business by slug
    async fn find_active_by_slug(&self, slug: &str) -> DbResult<Option<BusinessRow>>;

    /// Number of non-deleted businesses
    async fn count(&self) -> DbResult<u64>;
}

/// Create business input
#[derive(Debug, Clone)]
pub struct CreateBusiness {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Service repository trait
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Find an active, non-deleted service belonging to a business
    async fn find_active(&self, business_id: Uuid, service_id: Uuid)
        -> DbResult<Option<ServiceRow>>;

    /// All active, non-deleted services of a business, by name
    async fn list_active(&self, business_id: Uuid) -> DbResult<Vec<ServiceRow>>;

    /// Create a new service
    async fn create(&self, service: CreateService) -> DbResult<ServiceRow>;
}

/// Create service input
#[derive(Debug, Clone)]
pub struct CreateService {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking repository trait.
///
/// Every read excludes soft-deleted bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking
    async fn create(&self, booking: CreateBooking) -> DbResult<BookingRow>;

    /// Find a non-deleted booking by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>>;

    /// Set the status of a non-deleted booking.
    ///
    /// `completed_at` is only written when the stored value is still NULL.
    /// Returns `None` when no such booking exists.
    async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> DbResult<Option<BookingRow>>;

    /// One page of bookings matching the query
    async fn list(&self, query: &BookingQuery) -> DbResult<Vec<BookingRow>>;

    /// Number of bookings matching the filter
    async fn count(&self, filter: &BookingFilter) -> DbResult<u64>;

    /// Dashboard counters for a business
    async fn stats(
        &self,
        business_id: Uuid,
        today_start: DateTime<Utc>,
        week_start: DateTime<Utc>,
    ) -> DbResult<BookingStatsRow>;
}

/// Create booking input
#[derive(Debug, Clone)]
pub struct CreateBooking {
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
}

/// Booking filter; all present conditions are AND-composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Restrict to one business
    pub business_id: Option<Uuid>,
    /// Exact status match
    pub status: Option<String>,
    /// Exact service match
    pub service_id: Option<Uuid>,
    /// Inclusive lower bound on the appointment date
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the appointment date
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over name, email, phone and confirmation code
    pub search: Option<String>,
}

/// Booking list ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingSort {
    /// Newest appointment first
    #[default]
    AppointmentDateDesc,
    /// Most recently created first
    CreatedAtDesc,
}

impl BookingSort {
    /// SQL ORDER BY clause; `id` breaks ties so pages are stable
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::AppointmentDateDesc => "appointment_date DESC, id DESC",
            Self::CreatedAtDesc => "created_at DESC, id DESC",
        }
    }
}

/// A filtered, sorted page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingQuery {
    pub filter: BookingFilter,
    pub sort: BookingSort,
    pub offset: u64,
    pub limit: u64,
}

// ============================================================================
// Users, credentials and sessions
// ============================================================================

/// Local user repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Must equal the identity store ID of the same person
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub business_id: Option<Uuid>,
}

/// Credential store behind the identity provider
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find a credential by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>>;

    /// Find a credential by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>>;

    /// Create a new credential
    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow>;

    /// Delete a credential
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create credential input
#[derive(Debug, Clone)]
pub struct CreateIdentity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by token hash
    async fn find_by_token_hash(&self, token_hash: &str) -> DbResult<Option<SessionRow>>;

    /// Create a new session
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow>;

    /// Update last active timestamp
    async fn update_last_active(&self, id: Uuid) -> DbResult<()>;

    /// Revoke a session
    async fn revoke(&self, id: Uuid) -> DbResult<()>;

    /// Delete expired and revoked sessions
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create session input
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Multi-entity writes
// ============================================================================

/// Writes that span several tables and must commit together
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert a business, its owner and its initial services in one transaction
    async fn create_business_with_owner(
        &self,
        business: CreateBusiness,
        owner: CreateUser,
        services: Vec<CreateService>,
    ) -> DbResult<(BusinessRow, UserRow)>;
}
