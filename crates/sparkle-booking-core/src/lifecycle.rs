//! Booking lifecycle: creation, lookup and status changes

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sparkle_db::{
    BookingRepository, BookingRow, BusinessRepository, CreateBooking, DbError, Repositories,
    ServiceRepository,
};
use sparkle_types::{
    Booking, BookingConfirmation, BookingDetails, BookingId, BookingStatus, Business,
    BusinessContact, Identity, Service,
};

use crate::confirmation::generate_confirmation_code;
use crate::status::{Permissive, TransitionPolicy};
use crate::validation::ValidatedBooking;
use crate::BookingError;

/// Creates bookings and moves them through their statuses
#[derive(Clone)]
pub struct BookingService {
    businesses: Arc<dyn BusinessRepository>,
    services: Arc<dyn ServiceRepository>,
    bookings: Arc<dyn BookingRepository>,
    policy: Arc<dyn TransitionPolicy>,
}

impl BookingService {
    /// Create a service with the permissive transition policy
    pub fn new(repos: &Repositories) -> Self {
        Self {
            businesses: repos.businesses.clone(),
            services: repos.services.clone(),
            bookings: repos.bookings.clone(),
            policy: Arc::new(Permissive),
        }
    }

    /// Replace the transition policy
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Book a validated request with the active business
    pub async fn create_booking(
        &self,
        input: ValidatedBooking,
    ) -> Result<BookingConfirmation, BookingError> {
        self.create_booking_at(input, Utc::now()).await
    }

    /// Book a validated request, stamping it with `now`
    #[tracing::instrument(skip(self, input), fields(service_id = %input.service_id))]
    pub async fn create_booking_at(
        &self,
        input: ValidatedBooking,
        now: DateTime<Utc>,
    ) -> Result<BookingConfirmation, BookingError> {
        let business: Business = self
            .businesses
            .find_first_active()
            .await?
            .ok_or(BookingError::BusinessNotFound)?
            .into();

        let service: Service = self
            .services
            .find_active(business.id.0, input.service_id.0)
            .await?
            .ok_or(BookingError::ServiceNotFound)?
            .into();

        let create = CreateBooking {
            id: BookingId::new().0,
            business_id: business.id.0,
            service_id: Some(service.id.0),
            service_name: service.name.clone(),
            service_price_cents: service.price_cents,
            service_duration_minutes: service.duration_minutes,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            customer_phone: input.customer_phone,
            customer_address: input.address,
            appointment_date: input.appointment_date,
            appointment_time: input.appointment_time,
            duration_minutes: service.duration_minutes,
            total_price_cents: service.price_cents,
            notes: input.notes,
            status: BookingStatus::Pending.as_str().to_string(),
            confirmation_code: generate_confirmation_code(now),
            user_id: None,
        };

        let row = self.bookings.create(create).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => BookingError::DuplicateBooking,
            DbError::ForeignKeyViolation { .. } => BookingError::InvalidReference,
            other => BookingError::Database(other),
        })?;
        let booking = Booking::try_from(row)?;

        tracing::info!(
            booking_id = %booking.id,
            confirmation_code = %booking.confirmation_code,
            "Booking created"
        );

        Ok(BookingConfirmation {
            id: booking.id,
            confirmation_code: booking.confirmation_code,
            customer_name: booking.customer_name,
            service_name: booking.service_name,
            appointment_date: booking.appointment_date,
            appointment_time: booking.appointment_time,
            status: booking.status,
            business: business.contact(),
        })
    }

    /// Full booking with its business contact block
    pub async fn get_booking(&self, id: BookingId) -> Result<BookingDetails, BookingError> {
        let row = self
            .bookings
            .find_by_id(id.0)
            .await?
            .ok_or(BookingError::BookingNotFound)?;
        self.details(row).await
    }

    /// Change the status of a booking on behalf of `actor`.
    ///
    /// The role check runs before any lookup, so a caller without booking
    /// rights cannot learn which IDs exist. Bookings outside the actor's
    /// business are reported as not found.
    #[tracing::instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn update_status(
        &self,
        booking_id: BookingId,
        new_status: BookingStatus,
        actor: &Identity,
    ) -> Result<BookingDetails, BookingError> {
        if !actor.role.can_manage_bookings() {
            return Err(BookingError::Unauthorized);
        }

        let current = self
            .bookings
            .find_by_id(booking_id.0)
            .await?
            .filter(|row| {
                actor
                    .business_scope()
                    .map_or(true, |scope| scope.0 == row.business_id)
            })
            .ok_or(BookingError::BookingNotFound)?;

        let from: BookingStatus = current
            .status
            .parse()
            .map_err(|e: sparkle_types::ParseError| BookingError::Internal(e.to_string()))?;
        self.policy.check(from, new_status)?;

        let completed_at = (new_status == BookingStatus::Completed).then(Utc::now);

        let row = self
            .bookings
            .update_status(booking_id.0, new_status.as_str(), completed_at)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        tracing::info!(%booking_id, %from, to = %new_status, "Booking status updated");
        self.details(row).await
    }

    async fn details(&self, row: BookingRow) -> Result<BookingDetails, BookingError> {
        let business = self
            .businesses
            .find_by_id(row.business_id)
            .await?
            .map(contact_of)
            .ok_or(BookingError::BusinessNotFound)?;
        Ok(BookingDetails {
            booking: Booking::try_from(row)?,
            business,
        })
    }
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Contact block of a business row
pub(crate) fn contact_of(business: sparkle_db::BusinessRow) -> BusinessContact {
    Business::from(business).contact()
}
