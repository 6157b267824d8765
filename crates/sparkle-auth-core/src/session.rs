//! Session management with HMAC signing
//!
//! A session cookie is `<base64url(payload json)>.<base64url(hmac)>`. The
//! signature proves the cookie was minted here; the session table, keyed by
//! the SHA-256 of the full cookie, decides whether it is still live.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sparkle_db::{CreateSession, SessionRepository};
use sparkle_types::{Identity, SessionId, UserId};

use crate::crypto::{hash_token, HmacKey, HmacKeyError};
use crate::AuthError;

/// Signed session cookie payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionPayload {
    /// Session ID
    pub sid: String,
    /// User ID
    pub user_id: String,
    /// User email
    pub email: String,
    /// Issue timestamp (milliseconds)
    pub issued: i64,
    /// Expiration timestamp (milliseconds)
    pub expires: i64,
}

impl SessionPayload {
    /// Create a payload valid for `duration` from now
    pub fn new(
        session_id: SessionId,
        user_id: UserId,
        email: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        let lifetime = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self {
            sid: session_id.to_string(),
            user_id: user_id.to_string(),
            email: email.into(),
            issued: now,
            expires: now.saturating_add(lifetime),
        }
    }

    /// Check if the session is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }

    /// Get the user ID
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.user_id).ok()
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<SessionId> {
        SessionId::parse(&self.sid).ok()
    }
}

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: SessionId,
    /// Signed cookie value
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session manager handles session creation, signing, and validation
#[derive(Clone)]
pub struct SessionManager {
    hmac_key: HmacKey,
    session_duration: Duration,
    repo: Arc<dyn SessionRepository>,
}

impl SessionManager {
    /// Create a new session manager.
    ///
    /// Fails when `secret` is shorter than 32 bytes.
    pub fn new(
        secret: impl AsRef<[u8]>,
        session_duration: Duration,
        repo: Arc<dyn SessionRepository>,
    ) -> Result<Self, HmacKeyError> {
        Ok(Self {
            hmac_key: HmacKey::new(secret)?,
            session_duration,
            repo,
        })
    }

    /// Session lifetime
    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    /// Create a new session and return the signed cookie value
    pub async fn create_session(
        &self,
        identity: &Identity,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<IssuedSession, AuthError> {
        let session_id = SessionId::new();
        let payload = SessionPayload::new(
            session_id,
            identity.user_id,
            identity.email.clone(),
            self.session_duration,
        );
        let token = self.sign_payload(&payload)?;
        let expires_at = DateTime::<Utc>::from_timestamp_millis(payload.expires)
            .ok_or_else(|| AuthError::Internal("Session expiry out of range".to_string()))?;

        let create = CreateSession {
            id: session_id.0,
            user_id: identity.user_id.0,
            token_hash: hash_token(&token),
            ip_address,
            user_agent,
            expires_at,
        };

        self.repo.create(create).await.map_err(|e| {
            tracing::error!("Failed to create session: {}", e);
            AuthError::Internal("Failed to create session".to_string())
        })?;

        Ok(IssuedSession {
            session_id,
            token,
            expires_at,
        })
    }

    /// Validate a signed session cookie without touching the database
    pub fn validate_cookie(&self, cookie: &str) -> Result<SessionPayload, AuthError> {
        let (payload_b64, signature) = cookie.rsplit_once('.').ok_or(AuthError::InvalidToken)?;

        if !self.hmac_key.verify_b64(payload_b64.as_bytes(), signature) {
            tracing::debug!("Session signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let payload: SessionPayload =
            serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

        if payload.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(payload)
    }

    /// Validate a session cookie against the session table
    pub async fn validate_session(&self, cookie: &str) -> Result<SessionPayload, AuthError> {
        let payload = self.validate_cookie(cookie)?;

        let session = self
            .repo
            .find_by_token_hash(&hash_token(cookie))
            .await
            .map_err(|e| {
                tracing::error!("Failed to find session: {}", e);
                AuthError::Internal("Failed to validate session".to_string())
            })?;

        match session {
            Some(s) if s.revoked => {
                tracing::debug!("Session has been revoked");
                Err(AuthError::SessionRevoked)
            }
            Some(s) if s.expires_at < Utc::now() => {
                tracing::debug!("Session expired in database");
                Err(AuthError::TokenExpired)
            }
            Some(_) => Ok(payload),
            None => {
                tracing::warn!("Session not found in database - rejecting");
                Err(AuthError::SessionRevoked)
            }
        }
    }

    /// Revoke a session by ID
    pub async fn revoke_session(&self, session_id: SessionId) -> Result<(), AuthError> {
        self.repo.revoke(session_id.0).await.map_err(|e| {
            tracing::error!("Failed to revoke session: {}", e);
            AuthError::Internal("Failed to revoke session".to_string())
        })
    }

    /// Update last active timestamp
    pub async fn touch_session(&self, session_id: SessionId) -> Result<(), AuthError> {
        self.repo.update_last_active(session_id.0).await.map_err(|e| {
            tracing::error!("Failed to update session: {}", e);
            AuthError::Internal("Failed to update session".to_string())
        })
    }

    /// Drop expired and revoked sessions
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        self.repo.delete_expired().await.map_err(|e| {
            tracing::error!("Failed to purge sessions: {}", e);
            AuthError::Internal("Failed to purge sessions".to_string())
        })
    }

    fn sign_payload(&self, payload: &SessionPayload) -> Result<String, AuthError> {
        let payload_json = serde_json::to_vec(payload).map_err(|e| {
            tracing::error!("Failed to serialize payload: {}", e);
            AuthError::Internal("Failed to create session".to_string())
        })?;

        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
        let signature = self.hmac_key.sign_b64(payload_b64.as_bytes());

        Ok(format!("{payload_b64}.{signature}"))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_duration", &self.session_duration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkle_db::memory::MemoryStore;
    use sparkle_types::Role;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn manager(store: &MemoryStore, duration: Duration) -> SessionManager {
        SessionManager::new(SECRET, duration, Arc::new(store.clone())).unwrap()
    }

    fn identity() -> Identity {
        Identity::new(UserId::new(), "sarah@sparkleclean.com", Role::Admin)
    }

    #[test]
    fn test_short_secret_rejected() {
        let store = MemoryStore::new();
        assert!(SessionManager::new("short", Duration::from_secs(60), Arc::new(store)).is_err());
    }

    #[tokio::test]
    async fn test_create_and_validate() {
        let store = MemoryStore::new();
        let sessions = manager(&store, Duration::from_secs(3600));
        let who = identity();

        let issued = sessions.create_session(&who, None, None).await.unwrap();
        let payload = sessions.validate_session(&issued.token).await.unwrap();

        assert_eq!(payload.user_id(), Some(who.user_id));
        assert_eq!(payload.session_id(), Some(issued.session_id));
        assert_eq!(payload.email, "sarah@sparkleclean.com");
    }

    #[tokio::test]
    async fn test_tampered_cookie_rejected() {
        let store = MemoryStore::new();
        let sessions = manager(&store, Duration::from_secs(3600));
        let issued = sessions
            .create_session(&identity(), None, None)
            .await
            .unwrap();

        let mut tampered = issued.token.clone();
        tampered.insert(0, 'x');
        assert!(matches!(
            sessions.validate_cookie(&tampered),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            sessions.validate_cookie("no-dot-here"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_other_key_rejected() {
        let store = MemoryStore::new();
        let sessions = manager(&store, Duration::from_secs(3600));
        let issued = sessions
            .create_session(&identity(), None, None)
            .await
            .unwrap();

        let other = SessionManager::new(
            "another-secret-that-is-also-32-bytes-long",
            Duration::from_secs(3600),
            Arc::new(store),
        )
        .unwrap();
        assert!(matches!(
            other.validate_cookie(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_cookie_rejected() {
        let store = MemoryStore::new();
        let sessions = manager(&store, Duration::ZERO);
        let issued = sessions
            .create_session(&identity(), None, None)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(matches!(
            sessions.validate_cookie(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_revoked_session_rejected() {
        let store = MemoryStore::new();
        let sessions = manager(&store, Duration::from_secs(3600));
        let issued = sessions
            .create_session(&identity(), None, None)
            .await
            .unwrap();

        sessions.revoke_session(issued.session_id).await.unwrap();

        // Signature is still fine, the table says no.
        assert!(sessions.validate_cookie(&issued.token).is_ok());
        assert!(matches!(
            sessions.validate_session(&issued.token).await,
            Err(AuthError::SessionRevoked)
        ));
    }

    #[tokio::test]
    async fn test_signed_but_unknown_session_rejected() {
        let issuing_store = MemoryStore::new();
        let issuer = manager(&issuing_store, Duration::from_secs(3600));
        let issued = issuer.create_session(&identity(), None, None).await.unwrap();

        let fresh = manager(&MemoryStore::new(), Duration::from_secs(3600));
        assert!(matches!(
            fresh.validate_session(&issued.token).await,
            Err(AuthError::SessionRevoked)
        ));
    }

    #[tokio::test]
    async fn test_purge_drops_expired_and_revoked() {
        let store = MemoryStore::new();
        let short = manager(&store, Duration::ZERO);
        let long = manager(&store, Duration::from_secs(3600));
        let who = identity();

        short.create_session(&who, None, None).await.unwrap();
        let revoked = long.create_session(&who, None, None).await.unwrap();
        let live = long.create_session(&who, None, None).await.unwrap();
        long.revoke_session(revoked.session_id).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(long.purge_expired().await.unwrap(), 2);
        assert_eq!(store.session_count(), 1);
        assert!(long.validate_session(&live.token).await.is_ok());
    }
}
