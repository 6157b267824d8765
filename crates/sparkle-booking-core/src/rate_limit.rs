//! Fixed-window request rate limiting.
//!
//! Each identifier gets a counter per window, keyed by
//! `floor(now / window)`. Counters live only in this process, so several
//! replicas behind a load balancer each enforce the limit on their own
//! share of the traffic.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// End of the current window
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, at least 1
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000).max(1)
    }
}

/// In-memory fixed-window rate limiter
pub struct RateLimiter {
    window_ms: i64,
    purge_interval_ms: i64,
    counters: DashMap<(String, i64), u32>,
    last_purge_ms: AtomicI64,
}

impl RateLimiter {
    /// Default window length
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    /// Create a limiter with the given window length
    pub fn new(window: Duration) -> Self {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX).max(1);
        Self {
            window_ms,
            purge_interval_ms: window_ms,
            counters: DashMap::new(),
            last_purge_ms: AtomicI64::new(0),
        }
    }

    /// How often `check` sweeps expired windows
    #[must_use]
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Window length
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms as u64)
    }

    /// Count one request from `identifier` against `limit`
    pub fn check(&self, identifier: &str, limit: u32) -> RateLimitDecision {
        self.check_at(identifier, limit, Utc::now())
    }

    /// Count one request at an explicit point in time
    pub fn check_at(&self, identifier: &str, limit: u32, now: DateTime<Utc>) -> RateLimitDecision {
        let now_ms = now.timestamp_millis();
        self.maybe_purge(now_ms);

        let window = now_ms.div_euclid(self.window_ms);
        let reset_at = self.window_end(window);

        let mut count = self
            .counters
            .entry((identifier.to_string(), window))
            .or_insert(0);

        if *count >= limit {
            tracing::debug!(identifier, limit, "Rate limit exceeded");
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at,
            };
        }

        *count += 1;
        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit - *count,
            reset_at,
        }
    }

    /// Drop counters of windows that have ended
    pub fn purge_expired(&self) -> usize {
        self.purge_before(Utc::now().timestamp_millis())
    }

    /// Number of live counters
    pub fn tracked_keys(&self) -> usize {
        self.counters.len()
    }

    fn maybe_purge(&self, now_ms: i64) {
        let last = self.last_purge_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < self.purge_interval_ms {
            return;
        }
        if self
            .last_purge_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.purge_before(now_ms);
        }
    }

    fn purge_before(&self, now_ms: i64) -> usize {
        let current = now_ms.div_euclid(self.window_ms);
        let before = self.counters.len();
        self.counters.retain(|(_, window), _| *window >= current);
        let purged = before.saturating_sub(self.counters.len());
        if purged > 0 {
            tracing::trace!(purged, "Purged expired rate limit windows");
        }
        purged
    }

    fn window_end(&self, window: i64) -> DateTime<Utc> {
        let end_ms = window.saturating_add(1).saturating_mul(self.window_ms);
        Utc.timestamp_millis_opt(end_ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window_ms", &self.window_ms)
            .field("tracked_keys", &self.counters.len())
            .finish_non_exhaustive()
    }
}
