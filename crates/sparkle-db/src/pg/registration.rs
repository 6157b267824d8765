//! Transactional multi-table writes

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::{BusinessRow, UserRow};
use crate::pg::business::BUSINESS_COLUMNS;
use crate::pg::service::insert_service;
use crate::pg::user::insert_user;
use crate::repo::{CreateBusiness, CreateService, CreateUser, RegistrationStore};

/// PostgreSQL registration store
#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    /// Create a new registration store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    #[tracing::instrument(skip_all, fields(slug = %business.slug))]
    async fn create_business_with_owner(
        &self,
        business: CreateBusiness,
        owner: CreateUser,
        services: Vec<CreateService>,
    ) -> DbResult<(BusinessRow, UserRow)> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        let business_row = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            INSERT INTO businesses (id, name, slug, email, phone, address, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(business.id)
        .bind(&business.name)
        .bind(&business.slug)
        .bind(&business.email)
        .bind(&business.phone)
        .bind(&business.address)
        .bind(&business.description)
        .fetch_one(&mut *tx)
        .await?;

        let owner_row = insert_user(&mut *tx, &owner).await?;

        for service in &services {
            insert_service(&mut *tx, service).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            business_id = %business_row.id,
            owner_id = %owner_row.id,
            services = services.len(),
            "Business registered"
        );

        Ok((business_row, owner_row))
    }
}
