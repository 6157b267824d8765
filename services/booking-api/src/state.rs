//! Application state for the Booking API service.

use std::sync::Arc;

use sparkle_auth_core::{
    AuthConfig, HmacKeyError, IdentityGateway, LocalIdentityProvider, RegistrationService,
    SessionManager,
};
use sparkle_booking_core::{
    policy_for, AdminQueryService, BookingService, CatalogService, RateLimiter,
};
use sparkle_db::{DbPool, Repositories};

use crate::config::{Config, RateLimits};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Booking creation, lookup and status changes
    pub bookings: Arc<BookingService>,
    /// Admin list and dashboard queries
    pub queries: Arc<AdminQueryService>,
    /// Businesses and their services
    pub catalog: Arc<CatalogService>,
    /// Session resolution, login and logout
    pub gateway: Arc<IdentityGateway>,
    /// Business and staff registration
    pub registration: Arc<RegistrationService>,
    /// Limiter for public booking creation
    pub booking_limiter: Arc<RateLimiter>,
    /// Limiter for admin listing
    pub admin_limiter: Arc<RateLimiter>,
    /// Database pool, absent when running on in-memory repositories
    pub pool: Option<DbPool>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire services over a set of repositories
    pub fn new(repos: &Repositories, config: Config) -> Result<Self, HmacKeyError> {
        let sessions = SessionManager::new(
            &config.auth.session_secret,
            config.auth.session_duration,
            repos.sessions.clone(),
        )?;
        let provider = Arc::new(LocalIdentityProvider::new(repos.identities.clone()));

        let gateway = IdentityGateway::new(sessions, provider.clone(), repos.users.clone());
        let registration =
            RegistrationService::new(provider, repos.users.clone(), repos.registrations.clone());
        let bookings =
            BookingService::new(repos).with_policy(policy_for(config.strict_status_transitions));

        Ok(Self {
            bookings: Arc::new(bookings),
            queries: Arc::new(AdminQueryService::new(repos)),
            catalog: Arc::new(CatalogService::new(repos)),
            gateway: Arc::new(gateway),
            registration: Arc::new(registration),
            booking_limiter: Arc::new(RateLimiter::new(config.rate_limits.window)),
            admin_limiter: Arc::new(RateLimiter::new(config.rate_limits.window)),
            pool: None,
            config: Arc::new(config),
        })
    }

    /// Attach the database pool used by the readiness check
    #[must_use]
    pub fn with_pool(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }

    /// Session and cookie settings
    pub fn auth(&self) -> &AuthConfig {
        &self.config.auth
    }

    /// Rate limiter quotas
    pub fn limits(&self) -> RateLimits {
        self.config.rate_limits
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("has_pool", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}
