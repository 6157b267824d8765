//! PostgreSQL credential store implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::IdentityRow;
use crate::repo::{CreateIdentity, IdentityRepository};

/// PostgreSQL credential repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    /// Create a new credential repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>> {
        let identity = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash, created_at FROM auth_identities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>> {
        let identity = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash, created_at FROM auth_identities WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO auth_identities (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        sqlx::query("DELETE FROM auth_identities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
