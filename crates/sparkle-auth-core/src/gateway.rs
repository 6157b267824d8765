//! Identity gateway
//!
//! Resolves a session token to an [`Identity`], keeping the identity
//! provider and the local user table honest with each other: a person the
//! provider knows but the user table does not (or has deactivated) is a
//! sync mismatch, never a silent login.

use std::sync::Arc;

use sparkle_db::UserRepository;
use sparkle_types::{Identity, UserId};

use crate::provider::IdentityProvider;
use crate::session::{IssuedSession, SessionManager};
use crate::AuthError;

/// Reason reported when the provider has no record of the user
pub const REASON_NO_EXTERNAL_USER: &str = "No identity store user";
/// Reason reported when the provider knows the user but the database does not
pub const REASON_NO_LOCAL_USER: &str = "User exists in identity store but not in database";
/// Reason reported when the local user is deactivated or soft-deleted
pub const REASON_INACTIVE_USER: &str = "User is inactive or deleted";

/// Result of comparing the two identity stores for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub in_sync: bool,
    pub reason: Option<String>,
}

impl SyncStatus {
    fn ok() -> Self {
        Self {
            in_sync: true,
            reason: None,
        }
    }

    fn mismatch(reason: &str) -> Self {
        Self {
            in_sync: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub session: IssuedSession,
}

/// Gateway between session tokens and application identities
#[derive(Clone)]
pub struct IdentityGateway {
    sessions: SessionManager,
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

impl IdentityGateway {
    pub fn new(
        sessions: SessionManager,
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            sessions,
            provider,
            users,
        }
    }

    /// Session manager backing this gateway
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Resolve the caller behind a session token.
    ///
    /// A missing, malformed, expired or revoked token yields `Ok(None)`.
    /// A live session whose local user is missing or inactive yields
    /// [`AuthError::SyncMismatch`].
    #[tracing::instrument(skip(self, token))]
    pub async fn current_identity(
        &self,
        token: Option<&str>,
    ) -> Result<Option<Identity>, AuthError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let payload = match self.sessions.validate_session(token).await {
            Ok(payload) => payload,
            Err(e) if e.is_unauthenticated() => {
                tracing::debug!(error = %e, "Rejected session token");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(user_id) = payload.user_id() else {
            return Ok(None);
        };

        if self.provider.find_identity(user_id).await?.is_none() {
            tracing::debug!(%user_id, "Session user missing from identity store");
            return Ok(None);
        }

        let identity = self.local_identity(user_id).await?;

        if let Some(session_id) = payload.session_id() {
            if let Err(e) = self.sessions.touch_session(session_id).await {
                tracing::debug!(error = %e, "Failed to touch session");
            }
        }

        Ok(Some(identity))
    }

    /// Authenticate with email and password and open a session
    #[tracing::instrument(skip(self, password, user_agent))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<LoginOutcome, AuthError> {
        let external = self.provider.authenticate(email, password).await?;
        let identity = self.local_identity(external.id).await?;
        let session = self
            .sessions
            .create_session(&identity, ip_address, user_agent)
            .await?;

        // Each login adds a row; clear out the dead ones
        match self.sessions.purge_expired().await {
            Ok(purged) if purged > 0 => tracing::debug!(purged, "Purged stale sessions"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to purge stale sessions"),
        }

        tracing::info!(user_id = %identity.user_id, role = %identity.role, "User logged in");
        Ok(LoginOutcome { identity, session })
    }

    /// Revoke the session behind a token; unknown tokens are ignored
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let session_id = match self.sessions.validate_cookie(token) {
            Ok(payload) => payload.session_id(),
            Err(_) => None,
        };
        if let Some(session_id) = session_id {
            self.sessions.revoke_session(session_id).await?;
            tracing::info!(%session_id, "Session revoked");
        }
        Ok(())
    }

    /// Compare the identity store and the local user table for one user
    pub async fn validate_sync(&self, user_id: UserId) -> Result<SyncStatus, AuthError> {
        if self.provider.find_identity(user_id).await?.is_none() {
            return Ok(SyncStatus::mismatch(REASON_NO_EXTERNAL_USER));
        }
        match self.users.find_by_id(user_id.0).await? {
            None => Ok(SyncStatus::mismatch(REASON_NO_LOCAL_USER)),
            Some(user) if !user.is_available() => Ok(SyncStatus::mismatch(REASON_INACTIVE_USER)),
            Some(_) => Ok(SyncStatus::ok()),
        }
    }

    async fn local_identity(&self, user_id: UserId) -> Result<Identity, AuthError> {
        let user = match self.users.find_by_id(user_id.0).await? {
            Some(user) => user,
            None => {
                tracing::warn!(%user_id, "Identity store user has no local record");
                return Err(AuthError::sync_mismatch(REASON_NO_LOCAL_USER));
            }
        };
        if !user.is_available() {
            tracing::warn!(%user_id, "Local user is inactive or deleted");
            return Err(AuthError::sync_mismatch(REASON_INACTIVE_USER));
        }
        Ok(user.to_identity()?)
    }
}

impl std::fmt::Debug for IdentityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGateway")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}
