//! Demo data for an empty database

use sparkle_auth_core::{AuthError, NewService, RegisterBusiness, RegistrationService};
use sparkle_db::BusinessRepository;

use crate::config::SeedConfig;

/// Slug of the demo business
pub const DEMO_SLUG: &str = "sparkle-clean";

/// The demo business registration for `config`, or `None` without a password
pub fn demo_registration(config: &SeedConfig) -> Option<RegisterBusiness> {
    let password = config.admin_password.clone()?;
    Some(RegisterBusiness {
        business_name: "SparkleClean Professional Services".to_string(),
        slug: DEMO_SLUG.to_string(),
        business_email: "hello@sparkleclean.com".to_string(),
        business_phone: "+1-555-CLEAN-01".to_string(),
        address: Some("123 Main Street, Downtown, NY 10001".to_string()),
        description: Some(
            "Professional residential and commercial cleaning services with eco-friendly \
             products and experienced staff."
                .to_string(),
        ),
        owner_name: "Sarah Johnson".to_string(),
        owner_email: config.admin_email.clone(),
        owner_password: password,
        services: vec![
            NewService {
                name: "Basic House Cleaning".to_string(),
                description: Some(
                    "Standard cleaning including dusting, vacuuming, mopping, bathroom and \
                     kitchen cleaning."
                        .to_string(),
                ),
                price_cents: 12_000,
                duration_minutes: 120,
            },
            NewService {
                name: "Deep Cleaning Service".to_string(),
                description: Some(
                    "Baseboards, inside appliances, detailed bathroom scrubbing and thorough \
                     kitchen cleaning."
                        .to_string(),
                ),
                price_cents: 20_000,
                duration_minutes: 240,
            },
            NewService {
                name: "Office Space Cleaning".to_string(),
                description: Some(
                    "Desk sanitization, floor cleaning, restroom maintenance and common area \
                     tidying."
                        .to_string(),
                ),
                price_cents: 15_000,
                duration_minutes: 180,
            },
        ],
    })
}

/// Register the demo business when seeding is enabled and no business exists.
///
/// Returns whether anything was written.
pub async fn seed_demo_data(
    config: &SeedConfig,
    businesses: &dyn BusinessRepository,
    registration: &RegistrationService,
) -> Result<bool, AuthError> {
    if !config.enabled {
        return Ok(false);
    }

    if businesses.count().await? > 0 {
        tracing::debug!("Businesses present, skipping demo seed");
        return Ok(false);
    }

    let Some(input) = demo_registration(config) else {
        tracing::warn!("SEED_DEMO_DATA is set but ADMIN_PASSWORD is not, skipping demo seed");
        return Ok(false);
    };

    let registered = registration.register_business(input).await?;
    tracing::info!(
        business_id = %registered.business_id,
        admin = %registered.owner.email,
        "Seeded demo business"
    );
    Ok(true)
}
