//! Sparkle Auth Core - Authentication business logic
//!
//! Signed session cookies, the credential-backed identity provider, the
//! gateway that keeps the identity store and local users in sync, and the
//! two-phase registration flows.

pub mod config;
pub mod crypto;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod registration;
pub mod session;

pub use config::AuthConfig;
pub use crypto::{
    constant_time_eq, hash_password, hash_token, verify_password, HmacKey, HmacKeyError,
};
pub use error::AuthError;
pub use gateway::{IdentityGateway, LoginOutcome, SyncStatus};
pub use provider::{normalize_email, ExternalIdentity, IdentityProvider, LocalIdentityProvider};
pub use registration::{
    NewService, NewStaffMember, RegisterBusiness, RegisteredBusiness, RegistrationService,
};
pub use session::{IssuedSession, SessionManager, SessionPayload};
