//! Configuration for the Booking API service.

use std::time::Duration;

use sparkle_auth_core::AuthConfig;

/// Request quotas for the two injected rate limiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    /// Booking creations per client per window
    pub booking: u32,
    /// Admin list requests per client per window
    pub admin: u32,
    /// Fixed window length
    pub window: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            booking: 5,
            admin: 20,
            window: Duration::from_secs(60),
        }
    }
}

/// Demo data seeded into an empty database
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub enabled: bool,
    pub admin_email: String,
    /// Seeding is skipped when no password is configured
    pub admin_password: Option<String>,
}

/// Booking API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Session and cookie settings
    pub auth: AuthConfig,

    /// Request timeout
    pub request_timeout: Duration,

    /// Rate limiter quotas
    pub rate_limits: RateLimits,

    /// Reject status changes outside the lifecycle table
    pub strict_status_transitions: bool,

    /// Metrics enabled
    pub metrics_enabled: bool,

    /// Demo data seeding
    pub seed: SeedConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = parse_var("HTTP_PORT", 8080)?;

        // Sessions (secret must be at least 32 bytes)
        let session_secret =
            std::env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
        let session_hours: u64 = parse_var("SESSION_DURATION_HOURS", 24)?;
        let cookie_secure = parse_var("COOKIE_SECURE", true)?;

        let auth = AuthConfig::try_new(session_secret)
            .map_err(|_| ConfigError::Invalid("SESSION_SECRET"))?
            .with_session_duration(Duration::from_secs(session_hours * 60 * 60))
            .with_cookie_secure(cookie_secure);

        // Request timeout
        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", 30)?;

        // Rate limits
        let defaults = RateLimits::default();
        let rate_limits = RateLimits {
            booking: parse_var("BOOKING_RATE_LIMIT", defaults.booking)?,
            admin: parse_var("ADMIN_RATE_LIMIT", defaults.admin)?,
            window: Duration::from_secs(parse_var("RATE_LIMIT_WINDOW_SECS", 60)?),
        };
        if rate_limits.window.is_zero() {
            return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"));
        }

        let strict_status_transitions = parse_var("STRICT_STATUS_TRANSITIONS", false)?;

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        // Seeding
        let seed = SeedConfig {
            enabled: parse_var("SEED_DEMO_DATA", true)?,
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "sarah@sparkleclean.com".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
        };

        Ok(Self {
            http_port,
            database_url,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            rate_limits,
            strict_status_transitions,
            metrics_enabled,
            seed,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid(name))
        }
        _ => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
