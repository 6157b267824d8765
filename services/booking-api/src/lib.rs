//! SparkleClean Booking API
//!
//! ## REST Endpoints
//!
//! - `POST /api/bookings` - Create a booking (public, rate limited)
//! - `GET /api/bookings` - List bookings (staff, rate limited)
//! - `GET /api/bookings/{id}` - Booking details (public)
//! - `PATCH /api/bookings/{id}` - Update booking status (staff)
//! - `GET /api/services` - Services of the caller's business
//! - `GET /api/businesses/{slug}` - Public business page
//! - `GET /api/admin/dashboard` - Dashboard statistics (staff)
//! - `POST /api/admin/staff` - Add a staff member (admin)
//! - `POST /api/auth/register` - Register a business and its admin
//! - `POST /api/auth/login` - Open a session
//! - `POST /api/auth/logout` - Close the session
//! - `GET /api/auth/me` - Current identity
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod seed;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use config::{Config, ConfigError, RateLimits, SeedConfig};
pub use state::AppState;

use crate::handlers::{booking_method_not_allowed, health, ready};

/// Build the HTTP router with its middleware stack
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // Booking routes
    let bookings = Router::new()
        .route(
            "/bookings",
            get(handlers::list_bookings)
                .post(handlers::create_booking)
                .put(booking_method_not_allowed)
                .delete(booking_method_not_allowed),
        )
        .route(
            "/bookings/{id}",
            get(handlers::get_booking)
                .patch(handlers::update_booking_status)
                .put(booking_method_not_allowed)
                .delete(booking_method_not_allowed),
        );

    // Catalogue, admin and auth routes
    let api = bookings
        .route("/services", get(handlers::list_services))
        .route("/businesses/{slug}", get(handlers::get_business))
        .route("/admin/dashboard", get(handlers::dashboard))
        .route("/admin/staff", post(handlers::add_staff))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api", api)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

