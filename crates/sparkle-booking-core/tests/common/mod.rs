//! Common test utilities for sparkle-booking-core integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use sparkle_db::memory::MemoryStore;
use sparkle_db::{BookingRow, BusinessRow, Repositories, ServiceRow};
use sparkle_types::{BusinessId, Identity, Role, UserId};
use uuid::Uuid;

/// One business with one service, over a fresh in-memory store
pub struct Seeded {
    pub store: MemoryStore,
    pub repos: Repositories,
    pub business_id: Uuid,
    pub service_id: Uuid,
}

impl Seeded {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let business_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        store.insert_business(business_row(business_id, "sparkle-clean"));
        store.insert_service(service_row(business_id, service_id));
        let repos = Repositories::in_memory(store.clone());
        Self {
            store,
            repos,
            business_id,
            service_id,
        }
    }

    /// A STAFF identity belonging to the seeded business
    #[allow(dead_code)]
    pub fn staff(&self) -> Identity {
        Identity::new(UserId::new(), "mike@sparkleclean.com", Role::Staff)
            .with_business(BusinessId(self.business_id))
    }

    /// Insert a booking directly, returning its ID
    #[allow(dead_code)]
    pub fn booking(&self, fixture: BookingFixture) -> Uuid {
        let id = Uuid::new_v4();
        self.store.insert_booking(BookingRow {
            id,
            business_id: fixture.business_id.unwrap_or(self.business_id),
            service_id: Some(self.service_id),
            service_name: "Basic House Cleaning".into(),
            service_price_cents: fixture.price_cents,
            service_duration_minutes: 120,
            customer_name: fixture.name.clone(),
            customer_email: fixture.email.clone(),
            customer_phone: fixture.phone.clone(),
            customer_address: "1 Main Street".into(),
            appointment_date: fixture.appointment_date,
            appointment_time: "09:00".into(),
            duration_minutes: 120,
            total_price_cents: fixture.price_cents,
            notes: None,
            status: fixture.status.to_string(),
            confirmation_code: fixture.code.clone(),
            user_id: None,
            reminder_sent: false,
            completed_at: None,
            deleted_at: None,
            created_at: fixture.created_at,
            updated_at: fixture.created_at,
        });
        id
    }
}

/// Knobs for a directly inserted booking
#[derive(Clone)]
pub struct BookingFixture {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub code: String,
    pub status: &'static str,
    pub price_cents: i64,
    pub appointment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub business_id: Option<Uuid>,
}

impl BookingFixture {
    #[allow(dead_code)]
    pub fn numbered(n: u32) -> Self {
        let base = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        Self {
            name: format!("Customer {n}"),
            email: format!("customer{n}@example.com"),
            phone: format!("+1 555 {n:04}"),
            code: format!("BK-{n}-ABCDEFG"),
            status: "PENDING",
            price_cents: 12_000,
            appointment_date: base + Duration::days(i64::from(n)),
            created_at: Utc::now() - Duration::days(30) + Duration::minutes(i64::from(n)),
            business_id: None,
        }
    }
}

#[allow(dead_code)]
pub fn business_row(id: Uuid, slug: &str) -> BusinessRow {
    BusinessRow {
        id,
        name: "SparkleClean Professional Services".into(),
        slug: slug.into(),
        email: "hello@sparkleclean.com".into(),
        phone: "+1-555-CLEAN-01".into(),
        address: Some("123 Main Street, Downtown, NY 10001".into()),
        description: None,
        is_active: true,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// The "Basic House Cleaning" service row used by [`Seeded`]
#[allow(dead_code)]
pub fn service_row(business_id: Uuid, id: Uuid) -> ServiceRow {
    ServiceRow {
        id,
        business_id,
        name: "Basic House Cleaning".into(),
        description: None,
        price_cents: 12_000,
        duration_minutes: 120,
        is_active: true,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
