//! In-memory repositories
//!
//! A single `MemoryStore` implements every repository trait over shared
//! `DashMap`s, mirroring the constraints the Postgres schema enforces
//! (unique emails, slugs and confirmation codes, foreign keys to businesses).
//! Intended for tests and local development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::*;
use crate::repo::*;

/// Shared in-memory store
#[derive(Default, Clone)]
pub struct MemoryStore {
    businesses: Arc<DashMap<Uuid, BusinessRow>>,
    services: Arc<DashMap<Uuid, ServiceRow>>,
    bookings: Arc<DashMap<Uuid, BookingRow>>,
    users: Arc<DashMap<Uuid, UserRow>>,
    identities: Arc<DashMap<Uuid, IdentityRow>>,
    sessions: Arc<DashMap<Uuid, SessionRow>>,
    fail_user_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every local user insert fail with a database error
    pub fn fail_user_writes(&self, fail: bool) {
        self.fail_user_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a business row directly
    pub fn insert_business(&self, row: BusinessRow) {
        self.businesses.insert(row.id, row);
    }

    /// Insert a service row directly
    pub fn insert_service(&self, row: ServiceRow) {
        self.services.insert(row.id, row);
    }

    /// Insert a booking row directly
    pub fn insert_booking(&self, row: BookingRow) {
        self.bookings.insert(row.id, row);
    }

    /// Insert a user row directly
    pub fn insert_user(&self, row: UserRow) {
        self.users.insert(row.id, row);
    }

    /// Read a booking regardless of soft deletion
    pub fn booking(&self, id: Uuid) -> Option<BookingRow> {
        self.bookings.get(&id).map(|r| r.value().clone())
    }

    /// Read a user regardless of state
    pub fn user(&self, id: Uuid) -> Option<UserRow> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    /// Read a credential
    pub fn identity(&self, id: Uuid) -> Option<IdentityRow> {
        self.identities.get(&id).map(|r| r.value().clone())
    }

    /// Number of stored bookings, including soft-deleted ones
    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    /// Number of stored credentials
    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// Number of stored sessions, live or not
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of stored businesses
    pub fn business_count(&self) -> usize {
        self.businesses.len()
    }

    /// Mutate a stored business, e.g. to deactivate it
    pub fn update_business(&self, id: Uuid, f: impl FnOnce(&mut BusinessRow)) {
        if let Some(mut business) = self.businesses.get_mut(&id) {
            f(business.value_mut());
        }
    }

    /// Mutate a stored user, e.g. to deactivate it
    pub fn update_user(&self, id: Uuid, f: impl FnOnce(&mut UserRow)) {
        if let Some(mut user) = self.users.get_mut(&id) {
            f(user.value_mut());
        }
    }

    /// Mutate a stored booking, e.g. to soft-delete it
    pub fn update_booking(&self, id: Uuid, f: impl FnOnce(&mut BookingRow)) {
        if let Some(mut booking) = self.bookings.get_mut(&id) {
            f(booking.value_mut());
        }
    }

    fn check_user_insert(&self, user: &CreateUser) -> DbResult<()> {
        if self.fail_user_writes.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(DbError::UniqueViolation {
                constraint: "users_email_key".into(),
            });
        }
        Ok(())
    }

    fn check_business_exists(&self, id: Uuid, constraint: &str) -> DbResult<()> {
        if self.businesses.contains_key(&id) {
            Ok(())
        } else {
            Err(DbError::ForeignKeyViolation {
                constraint: constraint.to_string(),
            })
        }
    }
}

fn user_row(user: CreateUser) -> UserRow {
    let now = Utc::now();
    UserRow {
        id: user.id,
        email: user.email,
        name: user.name,
        phone: user.phone,
        role: user.role,
        business_id: user.business_id,
        is_active: true,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn service_row(service: CreateService) -> ServiceRow {
    let now = Utc::now();
    ServiceRow {
        id: service.id,
        business_id: service.business_id,
        name: service.name,
        description: service.description,
        price_cents: service.price_cents,
        duration_minutes: service.duration_minutes,
        is_active: true,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn matches_filter(row: &BookingRow, filter: &BookingFilter) -> bool {
    if row.deleted_at.is_some() {
        return false;
    }
    if filter.business_id.is_some_and(|id| id != row.business_id) {
        return false;
    }
    if filter.status.as_ref().is_some_and(|s| *s != row.status) {
        return false;
    }
    if filter.service_id.is_some() && filter.service_id != row.service_id {
        return false;
    }
    if filter.date_from.is_some_and(|from| row.appointment_date < from) {
        return false;
    }
    if filter.date_to.is_some_and(|to| row.appointment_date > to) {
        return false;
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        let hit = [
            &row.customer_name,
            &row.customer_email,
            &row.customer_phone,
            &row.confirmation_code,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    true
}

// ===== Businesses =====

#[async_trait]
impl BusinessRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>> {
        Ok(self.businesses.get(&id).map(|r| r.value().clone()))
    }

    async fn find_first_active(&self) -> DbResult<Option<BusinessRow>> {
        Ok(self
            .businesses
            .iter()
            .filter(|b| b.is_available())
            .min_by_key(|b| (b.created_at, b.id))
            .map(|b| b.value().clone()))
    }

    async fn find_active_by_slug(&self, slug: &str) -> DbResult<Option<BusinessRow>> {
        Ok(self
            .businesses
            .iter()
            .find(|b| b.slug == slug && b.is_available())
            .map(|b| b.value().clone()))
    }

    async fn count(&self) -> DbResult<u64> {
        Ok(self
            .businesses
            .iter()
            .filter(|b| b.deleted_at.is_none())
            .count() as u64)
    }
}

// ===== Services =====

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn find_active(
        &self,
        business_id: Uuid,
        service_id: Uuid,
    ) -> DbResult<Option<ServiceRow>> {
        Ok(self
            .services
            .get(&service_id)
            .filter(|s| s.business_id == business_id && s.is_available())
            .map(|s| s.value().clone()))
    }

    async fn list_active(&self, business_id: Uuid) -> DbResult<Vec<ServiceRow>> {
        let mut services: Vec<ServiceRow> = self
            .services
            .iter()
            .filter(|s| s.business_id == business_id && s.is_available())
            .map(|s| s.value().clone())
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn create(&self, service: CreateService) -> DbResult<ServiceRow> {
        self.check_business_exists(service.business_id, "services_business_id_fkey")?;
        let row = service_row(service);
        self.services.insert(row.id, row.clone());
        Ok(row)
    }
}

// ===== Bookings =====

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, booking: CreateBooking) -> DbResult<BookingRow> {
        self.check_business_exists(booking.business_id, "bookings_business_id_fkey")?;
        if self
            .bookings
            .iter()
            .any(|b| b.confirmation_code == booking.confirmation_code)
        {
            return Err(DbError::UniqueViolation {
                constraint: "bookings_confirmation_code_key".into(),
            });
        }

        let now = Utc::now();
        let row = BookingRow {
            id: booking.id,
            business_id: booking.business_id,
            service_id: booking.service_id,
            service_name: booking.service_name,
            service_price_cents: booking.service_price_cents,
            service_duration_minutes: booking.service_duration_minutes,
            customer_name: booking.customer_name,
            customer_email: booking.customer_email,
            customer_phone: booking.customer_phone,
            customer_address: booking.customer_address,
            appointment_date: booking.appointment_date,
            appointment_time: booking.appointment_time,
            duration_minutes: booking.duration_minutes,
            total_price_cents: booking.total_price_cents,
            notes: booking.notes,
            status: booking.status,
            confirmation_code: booking.confirmation_code,
            user_id: booking.user_id,
            reminder_sent: false,
            completed_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.bookings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>> {
        Ok(self
            .bookings
            .get(&id)
            .filter(|b| b.deleted_at.is_none())
            .map(|b| b.value().clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> DbResult<Option<BookingRow>> {
        let Some(mut booking) = self.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.deleted_at.is_some() {
            return Ok(None);
        }
        booking.status = status.to_string();
        if booking.completed_at.is_none() {
            booking.completed_at = completed_at;
        }
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn list(&self, query: &BookingQuery) -> DbResult<Vec<BookingRow>> {
        let mut rows: Vec<BookingRow> = self
            .bookings
            .iter()
            .filter(|b| matches_filter(b, &query.filter))
            .map(|b| b.value().clone())
            .collect();

        match query.sort {
            BookingSort::AppointmentDateDesc => {
                rows.sort_by(|a, b| (b.appointment_date, b.id).cmp(&(a.appointment_date, a.id)));
            }
            BookingSort::CreatedAtDesc => {
                rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            }
        }

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &BookingFilter) -> DbResult<u64> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| matches_filter(b, filter))
            .count() as u64)
    }

    async fn stats(
        &self,
        business_id: Uuid,
        today_start: DateTime<Utc>,
        week_start: DateTime<Utc>,
    ) -> DbResult<BookingStatsRow> {
        let mut stats = BookingStatsRow::default();
        for booking in self
            .bookings
            .iter()
            .filter(|b| b.business_id == business_id && b.deleted_at.is_none())
        {
            stats.total += 1;
            match booking.status.as_str() {
                "PENDING" => stats.pending += 1,
                "CONFIRMED" => stats.confirmed += 1,
                "COMPLETED" => stats.revenue_cents += booking.total_price_cents,
                _ => {}
            }
            if booking.created_at >= today_start {
                stats.created_today += 1;
            }
            if booking.created_at >= week_start {
                stats.created_this_week += 1;
            }
        }
        Ok(stats)
    }
}

// ===== Users =====

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        self.check_user_insert(&user)?;
        if let Some(business_id) = user.business_id {
            self.check_business_exists(business_id, "users_business_id_fkey")?;
        }
        let row = user_row(user);
        self.users.insert(row.id, row.clone());
        Ok(row)
    }
}

// ===== Credentials =====

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>> {
        Ok(self.identity(id))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>> {
        Ok(self
            .identities
            .iter()
            .find(|i| i.email == email)
            .map(|i| i.value().clone()))
    }

    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow> {
        if self.identities.iter().any(|i| i.email == identity.email) {
            return Err(DbError::UniqueViolation {
                constraint: "auth_identities_email_key".into(),
            });
        }
        let row = IdentityRow {
            id: identity.id,
            email: identity.email,
            password_hash: identity.password_hash,
            created_at: Utc::now(),
        };
        self.identities.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.identities.remove(&id);
        Ok(())
    }
}

// ===== Sessions =====

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_by_token_hash(&self, token_hash: &str) -> DbResult<Option<SessionRow>> {
        Ok(self
            .sessions
            .iter()
            .find(|s| s.token_hash == token_hash)
            .map(|s| s.value().clone()))
    }

    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        let now = Utc::now();
        let row = SessionRow {
            id: session.id,
            user_id: session.user_id,
            token_hash: session.token_hash,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: now,
            expires_at: session.expires_at,
            last_active_at: now,
            revoked: false,
        };
        self.sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_last_active(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.last_active_at = Utc::now();
        }
        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.revoked = true;
        }
        Ok(())
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at >= now && !s.revoked);
        Ok((before - self.sessions.len()) as u64)
    }
}

// ===== Registration =====

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn create_business_with_owner(
        &self,
        business: CreateBusiness,
        owner: CreateUser,
        services: Vec<CreateService>,
    ) -> DbResult<(BusinessRow, UserRow)> {
        // Validate everything up front so a failure leaves nothing behind.
        if self.businesses.iter().any(|b| b.slug == business.slug) {
            return Err(DbError::UniqueViolation {
                constraint: "businesses_slug_key".into(),
            });
        }
        self.check_user_insert(&owner)?;

        let now = Utc::now();
        let business_row = BusinessRow {
            id: business.id,
            name: business.name,
            slug: business.slug,
            email: business.email,
            phone: business.phone,
            address: business.address,
            description: business.description,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        let owner_row = user_row(owner);

        self.businesses.insert(business_row.id, business_row.clone());
        self.users.insert(owner_row.id, owner_row.clone());
        for service in services {
            let row = service_row(service);
            self.services.insert(row.id, row);
        }

        Ok((business_row, owner_row))
    }
}
