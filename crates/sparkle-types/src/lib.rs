//! Sparkle Types - Shared domain types
//!
//! This crate contains domain types used across the booking service:
//! - Entity identifiers
//! - Roles and authenticated identities
//! - Businesses, services and bookings
//! - Contact detail checks
//! - The JSON response envelope

pub mod api;
pub mod booking;
pub mod business;
pub mod contact;
pub mod error;
pub mod ids;
pub mod role;

pub use api::*;
pub use booking::*;
pub use business::*;
pub use contact::*;
pub use error::*;
pub use ids::*;
pub use role::*;
