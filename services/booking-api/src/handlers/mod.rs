//! REST API handlers

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod businesses;
pub mod health;
pub mod services;
pub mod shared;
pub mod views;

pub use admin::*;
pub use auth::*;
pub use bookings::*;
pub use businesses::*;
pub use health::*;
pub use services::*;
