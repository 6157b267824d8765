//! PostgreSQL booking repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{BookingRow, BookingStatsRow};
use crate::repo::{BookingFilter, BookingQuery, BookingRepository, CreateBooking};

const BOOKING_COLUMNS: &str = "id, business_id, service_id, service_name, service_price_cents, \
     service_duration_minutes, customer_name, customer_email, customer_phone, customer_address, \
     appointment_date, appointment_time, duration_minutes, total_price_cents, notes, status, \
     confirmation_code, user_id, reminder_sent, completed_at, deleted_at, created_at, updated_at";

/// PostgreSQL booking repository
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters so user input only ever matches literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append the WHERE clause for a filter
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookingFilter) {
    qb.push(" WHERE deleted_at IS NULL");

    if let Some(business_id) = filter.business_id {
        qb.push(" AND business_id = ").push_bind(business_id);
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(service_id) = filter.service_id {
        qb.push(" AND service_id = ").push_bind(service_id);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND appointment_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND appointment_date <= ").push_bind(to);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (customer_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR confirmation_code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, booking: CreateBooking) -> DbResult<BookingRow> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                id, business_id, service_id, service_name, service_price_cents,
                service_duration_minutes, customer_name, customer_email, customer_phone,
                customer_address, appointment_date, appointment_time, duration_minutes,
                total_price_cents, notes, status, confirmation_code, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.business_id)
        .bind(booking.service_id)
        .bind(&booking.service_name)
        .bind(booking.service_price_cents)
        .bind(booking.service_duration_minutes)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.customer_address)
        .bind(booking.appointment_date)
        .bind(&booking.appointment_time)
        .bind(booking.duration_minutes)
        .bind(booking.total_price_cents)
        .bind(&booking.notes)
        .bind(&booking.status)
        .bind(&booking.confirmation_code)
        .bind(booking.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>> {
        let booking = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> DbResult<Option<BookingRow>> {
        let booking = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $2,
                completed_at = COALESCE(completed_at, $3),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn list(&self, query: &BookingQuery) -> DbResult<Vec<BookingRow>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        push_filter(&mut qb, &query.filter);
        qb.push(" ORDER BY ").push(query.sort.order_by());
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX));
        qb.push(" OFFSET ")
            .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count(&self, filter: &BookingFilter) -> DbResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn stats(
        &self,
        business_id: Uuid,
        today_start: DateTime<Utc>,
        week_start: DateTime<Utc>,
    ) -> DbResult<BookingStatsRow> {
        let stats = sqlx::query_as::<_, BookingStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE status = 'CONFIRMED') AS confirmed,
                COALESCE(SUM(total_price_cents) FILTER (WHERE status = 'COMPLETED'), 0)::BIGINT
                    AS revenue_cents,
                COUNT(*) FILTER (WHERE created_at >= $2) AS created_today,
                COUNT(*) FILTER (WHERE created_at >= $3) AS created_this_week
            FROM bookings
            WHERE business_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(business_id)
        .bind(today_start)
        .bind(week_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }

    #[test]
    fn test_filter_sql_shape() {
        let filter = BookingFilter {
            business_id: Some(Uuid::nil()),
            status: Some("PENDING".into()),
            search: Some("ada".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filter(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("deleted_at IS NULL"));
        assert!(sql.contains("business_id = $1"));
        assert!(sql.contains("status = $2"));
        assert!(sql.contains("confirmation_code ILIKE $6"));
        assert!(!sql.contains("appointment_date"));
    }

    #[test]
    fn test_empty_search_adds_no_clause() {
        let filter = BookingFilter {
            search: Some(String::new()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filter(&mut qb, &filter);
        assert!(!qb.sql().contains("ILIKE"));
    }
}
