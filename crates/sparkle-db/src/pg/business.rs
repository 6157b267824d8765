//! PostgreSQL business repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::BusinessRow;
use crate::repo::BusinessRepository;

pub(crate) const BUSINESS_COLUMNS: &str = "id, name, slug, email, phone, address, description, \
     is_active, deleted_at, created_at, updated_at";

/// PostgreSQL business repository
#[derive(Clone)]
pub struct PgBusinessRepository {
    pool: PgPool,
}

impl PgBusinessRepository {
    /// Create a new business repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for PgBusinessRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>> {
        let business = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn find_first_active(&self) -> DbResult<Option<BusinessRow>> {
        let business = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            SELECT {BUSINESS_COLUMNS}
            FROM businesses
            WHERE is_active AND deleted_at IS NULL
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn find_active_by_slug(&self, slug: &str) -> DbResult<Option<BusinessRow>> {
        let business = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            SELECT {BUSINESS_COLUMNS}
            FROM businesses
            WHERE slug = $1 AND is_active AND deleted_at IS NULL
            "#
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn count(&self) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM businesses WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}
