//! Admin dashboard statistics

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sparkle_db::{BookingFilter, BookingQuery, BookingSort};
use sparkle_types::{cents_to_amount, Booking, BookingId, BookingStatus, Identity};

use crate::query::AdminQueryService;
use crate::BookingError;

/// How many recent bookings the dashboard shows
pub const RECENT_BOOKINGS: u64 = 10;

/// A line in the "recent bookings" panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBooking {
    pub id: BookingId,
    pub customer_name: String,
    pub service_name: String,
    pub appointment_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<Booking> for RecentBooking {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            customer_name: booking.customer_name,
            service_name: booking.service_name,
            appointment_date: booking.appointment_date,
            status: booking.status,
        }
    }
}

/// Headline numbers for one business
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    /// Sum of completed bookings, in currency units
    pub total_revenue: f64,
    /// Created since UTC midnight
    pub today_bookings: u64,
    /// Created in the last 7 days
    pub week_bookings: u64,
    pub recent_bookings: Vec<RecentBooking>,
}

impl AdminQueryService {
    /// Dashboard numbers for the actor's business as of `now`
    #[tracing::instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn dashboard_stats(
        &self,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, BookingError> {
        let business_id = Self::scope_for(actor)?.ok_or(BookingError::BusinessNotFound)?;

        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let week_start = now - Duration::days(7);

        let recent = BookingQuery {
            filter: BookingFilter {
                business_id: Some(business_id),
                ..Default::default()
            },
            sort: BookingSort::CreatedAtDesc,
            offset: 0,
            limit: RECENT_BOOKINGS,
        };

        let (counts, rows) = tokio::try_join!(
            self.bookings.stats(business_id, today_start, week_start),
            self.bookings.list(&recent)
        )?;

        let recent_bookings = rows
            .into_iter()
            .map(|row| Booking::try_from(row).map(RecentBooking::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardStats {
            total_bookings: to_count(counts.total),
            pending_bookings: to_count(counts.pending),
            confirmed_bookings: to_count(counts.confirmed),
            total_revenue: cents_to_amount(counts.revenue_cents),
            today_bookings: to_count(counts.created_today),
            week_bookings: to_count(counts.created_this_week),
            recent_bookings,
        })
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
