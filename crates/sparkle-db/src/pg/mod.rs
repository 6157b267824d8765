//! PostgreSQL repository implementations

mod booking;
mod business;
mod identity;
mod registration;
mod service;
mod session;
mod user;

pub use booking::PgBookingRepository;
pub use business::PgBusinessRepository;
pub use identity::PgIdentityRepository;
pub use registration::PgRegistrationStore;
pub use service::PgServiceRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;

use std::sync::Arc;

use crate::repo::{
    BookingRepository, BusinessRepository, IdentityRepository, RegistrationStore,
    ServiceRepository, SessionRepository, UserRepository,
};
use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub businesses: Arc<dyn BusinessRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub identities: Arc<dyn IdentityRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub registrations: Arc<dyn RegistrationStore>,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            businesses: Arc::new(PgBusinessRepository::new(pool.clone())),
            services: Arc::new(PgServiceRepository::new(pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            identities: Arc::new(PgIdentityRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            registrations: Arc::new(PgRegistrationStore::new(pool)),
        }
    }

    /// Create all repositories over one shared in-memory store
    #[cfg(feature = "memory")]
    pub fn in_memory(store: crate::memory::MemoryStore) -> Self {
        Self {
            businesses: Arc::new(store.clone()),
            services: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            identities: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            registrations: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
