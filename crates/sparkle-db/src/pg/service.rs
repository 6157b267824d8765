//! PostgreSQL service catalogue repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ServiceRow;
use crate::repo::{CreateService, ServiceRepository};

const SERVICE_COLUMNS: &str = "id, business_id, name, description, price_cents, \
     duration_minutes, is_active, deleted_at, created_at, updated_at";

/// PostgreSQL service repository
#[derive(Clone)]
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert a service using any executor (pool or open transaction)
pub(crate) async fn insert_service<'e, E>(executor: E, service: &CreateService) -> DbResult<ServiceRow>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, ServiceRow>(&format!(
        r#"
        INSERT INTO services (id, business_id, name, description, price_cents, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SERVICE_COLUMNS}
        "#
    ))
    .bind(service.id)
    .bind(service.business_id)
    .bind(&service.name)
    .bind(&service.description)
    .bind(service.price_cents)
    .bind(service.duration_minutes)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn find_active(
        &self,
        business_id: Uuid,
        service_id: Uuid,
    ) -> DbResult<Option<ServiceRow>> {
        let service = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
            SELECT {SERVICE_COLUMNS}
            FROM services
            WHERE id = $1 AND business_id = $2 AND is_active AND deleted_at IS NULL
            "#
        ))
        .bind(service_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    async fn list_active(&self, business_id: Uuid) -> DbResult<Vec<ServiceRow>> {
        let services = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
            SELECT {SERVICE_COLUMNS}
            FROM services
            WHERE business_id = $1 AND is_active AND deleted_at IS NULL
            ORDER BY name ASC
            "#
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn create(&self, service: CreateService) -> DbResult<ServiceRow> {
        insert_service(&self.pool, &service).await
    }
}
