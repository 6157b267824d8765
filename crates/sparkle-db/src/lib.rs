//! Sparkle DB - Database abstractions
//!
//! SQLx-based persistence for businesses, services, bookings, users,
//! credentials and sessions.
//!
//! # Example
//!
//! ```rust,ignore
//! use sparkle_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/sparkle").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::postgres(pool);
//!
//! let business = repos.businesses.find_first_active().await?;
//! ```

pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
