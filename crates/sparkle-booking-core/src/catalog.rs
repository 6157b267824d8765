//! Service catalogue lookups

use std::sync::Arc;

use sparkle_db::{BusinessRepository, Repositories, ServiceRepository};
use sparkle_types::{Business, BusinessId, Service};

use crate::BookingError;

/// An active business with the services it currently offers
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessProfile {
    pub business: Business,
    pub services: Vec<Service>,
}

/// Read access to businesses and their services
#[derive(Clone)]
pub struct CatalogService {
    businesses: Arc<dyn BusinessRepository>,
    services: Arc<dyn ServiceRepository>,
}

impl CatalogService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            businesses: repos.businesses.clone(),
            services: repos.services.clone(),
        }
    }

    /// Active services of an active business, by name
    pub async fn list_business_services(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Service>, BookingError> {
        let business = self
            .businesses
            .find_by_id(business_id.0)
            .await?
            .filter(|b| b.is_available())
            .ok_or(BookingError::BusinessNotFound)?;

        let services = self.services.list_active(business.id).await?;
        Ok(services.into_iter().map(Service::from).collect())
    }

    /// Public profile of an active business
    pub async fn business_by_slug(&self, slug: &str) -> Result<BusinessProfile, BookingError> {
        let business: Business = self
            .businesses
            .find_active_by_slug(slug)
            .await?
            .ok_or(BookingError::BusinessNotFound)?
            .into();

        let services = self
            .services
            .list_active(business.id.0)
            .await?
            .into_iter()
            .map(Service::from)
            .collect();

        Ok(BusinessProfile { business, services })
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}
