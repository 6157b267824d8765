//! JSON projections of domain types

use chrono::{DateTime, Utc};
use serde::Serialize;
use sparkle_booking_core::BusinessProfile;
use sparkle_types::{
    cents_to_amount, BookingDetails, BookingId, BookingStatus, BusinessContact, BusinessId,
    PageInfo, Service, ServiceId,
};

/// Full booking as returned to staff and to the confirmation page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: BookingId,
    pub confirmation_code: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub service_id: Option<ServiceId>,
    pub service_name: String,
    pub service_price: f64,
    pub service_duration: i32,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub duration: i32,
    pub total_price: f64,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub business: BusinessContact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingDetails> for BookingView {
    fn from(details: BookingDetails) -> Self {
        let b = details.booking;
        Self {
            id: b.id,
            confirmation_code: b.confirmation_code,
            customer_name: b.customer_name,
            customer_email: b.customer_email,
            customer_phone: b.customer_phone,
            customer_address: b.customer_address,
            service_id: b.service_id,
            service_name: b.service_name,
            service_price: cents_to_amount(b.service_price_cents),
            service_duration: b.service_duration_minutes,
            appointment_date: b.appointment_date,
            appointment_time: b.appointment_time,
            duration: b.duration_minutes,
            total_price: cents_to_amount(b.total_price_cents),
            notes: b.notes,
            status: b.status,
            completed_at: b.completed_at,
            business: details.business,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// One page of bookings
#[derive(Debug, Clone, Serialize)]
pub struct BookingListView {
    pub bookings: Vec<BookingView>,
    pub pagination: PageInfo,
}

/// A bookable service; `duration` is in hours
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: f64,
}

impl From<Service> for ServiceView {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            price: cents_to_amount(service.price_cents),
            duration: f64::from(service.duration_minutes) / 60.0,
        }
    }
}

/// Public business page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessView {
    pub id: BusinessId,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub services: Vec<ServiceView>,
}

impl From<BusinessProfile> for BusinessView {
    fn from(profile: BusinessProfile) -> Self {
        let business = profile.business;
        Self {
            id: business.id,
            name: business.name,
            slug: business.slug,
            email: business.email,
            phone: business.phone,
            address: business.address,
            description: business.description,
            services: profile.services.into_iter().map(ServiceView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_duration_in_hours() {
        let service = Service {
            id: ServiceId::new(),
            business_id: BusinessId::new(),
            name: "Deep Cleaning Service".into(),
            description: None,
            price_cents: 20_000,
            duration_minutes: 90,
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
        };
        let view = ServiceView::from(service);
        assert_eq!(view.duration, 1.5);
        assert_eq!(view.price, 200.0);
    }
}
