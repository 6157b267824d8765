//! Shared handler utilities: rate limiting and metrics

use std::time::Instant;

use sparkle_booking_core::{RateLimitDecision, RateLimiter};

use crate::error::ApiError;

// ============================================================================
// Rate Limiting
// ============================================================================

/// Count a request against `limiter`, failing with 429 once the quota is spent.
///
/// `name` labels the rejection metric (`booking` or `admin`).
pub fn enforce_rate_limit(
    limiter: &RateLimiter,
    name: &'static str,
    identifier: &str,
    limit: u32,
    message: &'static str,
) -> Result<RateLimitDecision, ApiError> {
    let decision = limiter.check(identifier, limit);
    if decision.allowed {
        return Ok(decision);
    }

    metrics::counter!("rate_limit_rejections_total", "limiter" => name).increment(1);
    tracing::warn!(limiter = name, identifier, limit, "Rate limit exceeded");

    Err(ApiError::RateLimited { message, decision })
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "booking_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

/// Run a handler body and record its duration
pub async fn timed<T, F>(operation: &'static str, body: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    let start = Instant::now();
    let result = body.await;
    record_op_duration(operation, start, result.is_ok());
    result
}
