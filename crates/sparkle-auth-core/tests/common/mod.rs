//! Common test utilities for sparkle-auth-core integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sparkle_auth_core::{
    AuthError, ExternalIdentity, IdentityGateway, IdentityProvider, LocalIdentityProvider,
    RegistrationService, SessionManager,
};
use sparkle_db::memory::MemoryStore;
use sparkle_db::UserRow;
use sparkle_types::{Role, UserId};
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Identity provider whose deletes can be made to fail
#[derive(Clone)]
pub struct FlakyProvider {
    inner: LocalIdentityProvider,
    fail_deletes: Arc<AtomicBool>,
}

impl FlakyProvider {
    pub fn new(store: &MemoryStore) -> Self {
        Self {
            inner: LocalIdentityProvider::new(Arc::new(store.clone())),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    #[allow(dead_code)]
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for FlakyProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ExternalIdentity, AuthError> {
        self.inner.create_identity(email, password).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ExternalIdentity, AuthError> {
        self.inner.authenticate(email, password).await
    }

    async fn find_identity(&self, id: UserId) -> Result<Option<ExternalIdentity>, AuthError> {
        self.inner.find_identity(id).await
    }

    async fn delete_identity(&self, id: UserId) -> Result<(), AuthError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AuthError::Internal("identity store unavailable".into()));
        }
        self.inner.delete_identity(id).await
    }
}

/// Everything the auth flows need, wired over one in-memory store
pub struct Fixture {
    pub store: MemoryStore,
    pub provider: FlakyProvider,
    pub gateway: IdentityGateway,
    pub registration: RegistrationService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let provider = FlakyProvider::new(&store);
        let sessions =
            SessionManager::new(SECRET, Duration::from_secs(3600), Arc::new(store.clone()))
                .expect("secret is long enough");
        let gateway = IdentityGateway::new(
            sessions,
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
        );
        let registration = RegistrationService::new(
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        Self {
            store,
            provider,
            gateway,
            registration,
        }
    }

    /// Create a provider identity without any local user
    #[allow(dead_code)]
    pub async fn external_only(&self, email: &str, password: &str) -> ExternalIdentity {
        self.provider
            .create_identity(email, password)
            .await
            .expect("identity created")
    }

    /// Create a provider identity plus a matching local user
    #[allow(dead_code)]
    pub async fn user(&self, email: &str, password: &str, role: Role) -> ExternalIdentity {
        let external = self.external_only(email, password).await;
        self.store.insert_user(user_row(external.id.0, email, role, None));
        external
    }
}

#[allow(dead_code)]
pub fn user_row(id: Uuid, email: &str, role: Role, business_id: Option<Uuid>) -> UserRow {
    UserRow {
        id,
        email: email.to_string(),
        name: Some("Test User".to_string()),
        phone: None,
        role: role.as_str().to_string(),
        business_id,
        is_active: true,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
