//! Identity provider
//!
//! The credential store that authenticates people. Local user records hang
//! off the IDs it hands out.

use std::sync::Arc;

use async_trait::async_trait;
use sparkle_db::{CreateIdentity, IdentityRepository, IdentityRow};
use sparkle_types::UserId;

use crate::crypto::{hash_password, verify_password};
use crate::AuthError;

/// A person as the identity provider knows them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub id: UserId,
    pub email: String,
}

impl From<IdentityRow> for ExternalIdentity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
        }
    }
}

/// External identity store
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new credential; the returned ID becomes the local user ID
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ExternalIdentity, AuthError>;

    /// Check an email/password pair
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<ExternalIdentity, AuthError>;

    /// Look up an identity by ID
    async fn find_identity(&self, id: UserId) -> Result<Option<ExternalIdentity>, AuthError>;

    /// Remove an identity
    async fn delete_identity(&self, id: UserId) -> Result<(), AuthError>;
}

/// Normalized form of an email address used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2-backed provider over the credential table
#[derive(Clone)]
pub struct LocalIdentityProvider {
    repo: Arc<dyn IdentityRepository>,
}

impl LocalIdentityProvider {
    pub fn new(repo: Arc<dyn IdentityRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ExternalIdentity, AuthError> {
        let password_hash = hash_password(password).map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AuthError::Internal("Failed to hash password".to_string())
        })?;

        let row = self
            .repo
            .create(CreateIdentity {
                id: UserId::new().0,
                email: normalize_email(email),
                password_hash,
            })
            .await?;

        Ok(row.into())
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ExternalIdentity, AuthError> {
        let row = self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &row.password_hash) {
            tracing::debug!(email = %row.email, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(row.into())
    }

    async fn find_identity(&self, id: UserId) -> Result<Option<ExternalIdentity>, AuthError> {
        Ok(self.repo.find_by_id(id.0).await?.map(Into::into))
    }

    async fn delete_identity(&self, id: UserId) -> Result<(), AuthError> {
        self.repo.delete(id.0).await?;
        Ok(())
    }
}

impl std::fmt::Debug for LocalIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentityProvider").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkle_db::memory::MemoryStore;

    fn provider() -> (MemoryStore, LocalIdentityProvider) {
        let store = MemoryStore::new();
        let provider = LocalIdentityProvider::new(Arc::new(store.clone()));
        (store, provider)
    }

    #[tokio::test]
    async fn test_create_then_authenticate() {
        let (_, provider) = provider();
        let created = provider
            .create_identity(" Mike@SparkleClean.com ", "staff-password")
            .await
            .unwrap();
        assert_eq!(created.email, "mike@sparkleclean.com");

        let authed = provider
            .authenticate("mike@sparkleclean.com", "staff-password")
            .await
            .unwrap();
        assert_eq!(authed, created);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let (_, provider) = provider();
        provider
            .create_identity("mike@sparkleclean.com", "staff-password")
            .await
            .unwrap();

        assert!(matches!(
            provider.authenticate("mike@sparkleclean.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.authenticate("ghost@sparkleclean.com", "staff-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_taken() {
        let (_, provider) = provider();
        provider
            .create_identity("mike@sparkleclean.com", "staff-password")
            .await
            .unwrap();
        assert!(matches!(
            provider
                .create_identity("MIKE@sparkleclean.com", "other-password")
                .await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_delete_identity() {
        let (store, provider) = provider();
        let created = provider
            .create_identity("mike@sparkleclean.com", "staff-password")
            .await
            .unwrap();
        assert_eq!(store.identity_count(), 1);

        provider.delete_identity(created.id).await.unwrap();
        assert_eq!(store.identity_count(), 0);
        assert!(provider.find_identity(created.id).await.unwrap().is_none());
    }
}
