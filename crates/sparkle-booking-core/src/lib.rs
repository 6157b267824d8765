//! Sparkle Booking Core - Booking business logic
//!
//! Request validation, the booking lifecycle and its status policy, admin
//! queries and dashboard numbers, the service catalogue, and the
//! fixed-window rate limiter that guards the public endpoints.

pub mod catalog;
pub mod confirmation;
pub mod error;
pub mod lifecycle;
pub mod query;
pub mod rate_limit;
pub mod stats;
pub mod status;
pub mod validation;

pub use catalog::{BusinessProfile, CatalogService};
pub use confirmation::{generate_confirmation_code, is_confirmation_code};
pub use error::BookingError;
pub use lifecycle::BookingService;
pub use query::{AdminQueryService, BookingFilters, BookingListQuery, SortOrder};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use stats::{DashboardStats, RecentBooking};
pub use status::{policy_for, Permissive, Strict, TransitionPolicy};
pub use validation::{validate, validate_json, BookingRequest, FieldError, ValidatedBooking};
