//! Account registration
//!
//! Creating an account touches two stores that cannot share a transaction:
//! the identity provider and the local database. Registration therefore
//! runs in two phases. Phase 1 creates the provider identity; phase 2
//! writes the local rows. When phase 2 fails the provider identity is
//! deleted again. A failed delete is logged as `compensation_failed` and
//! left for an operator; the phase-2 error is what the caller sees.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sparkle_db::{
    CreateBusiness, CreateService, CreateUser, RegistrationStore, UserRepository,
};
use sparkle_types::{is_valid_email, is_valid_slug, BusinessId, Identity, Role, ServiceId, UserId};

use crate::provider::{normalize_email, IdentityProvider};
use crate::AuthError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Service offered by a newly registered business
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

/// Input for registering a business together with its administrator
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBusiness {
    pub business_name: String,
    pub slug: String,
    pub business_email: String,
    pub business_phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_password: String,
    #[serde(default)]
    pub services: Vec<NewService>,
}

/// A registered business and its administrator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredBusiness {
    pub business_id: BusinessId,
    pub owner: Identity,
}

/// Input for adding a staff member to the caller's business
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffMember {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Two-phase account creation
#[derive(Clone)]
pub struct RegistrationService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    registrations: Arc<dyn RegistrationStore>,
}

impl RegistrationService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        registrations: Arc<dyn RegistrationStore>,
    ) -> Self {
        Self {
            provider,
            users,
            registrations,
        }
    }

    /// Register a business, its ADMIN user and its initial services
    #[tracing::instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn register_business(
        &self,
        input: RegisterBusiness,
    ) -> Result<RegisteredBusiness, AuthError> {
        validate_business(&input)?;

        // Phase 1: identity store
        let external = self
            .provider
            .create_identity(&input.owner_email, &input.owner_password)
            .await?;

        // Phase 2: business, owner and services in one transaction
        let business_id = BusinessId::new();
        let business = CreateBusiness {
            id: business_id.0,
            name: input.business_name.trim().to_string(),
            slug: input.slug,
            email: normalize_email(&input.business_email),
            phone: input.business_phone.trim().to_string(),
            address: non_empty(input.address),
            description: non_empty(input.description),
        };
        let owner = CreateUser {
            id: external.id.0,
            email: external.email.clone(),
            name: Some(input.owner_name.trim().to_string()),
            phone: None,
            role: Role::Admin.as_str().to_string(),
            business_id: Some(business_id.0),
        };
        let services = input
            .services
            .into_iter()
            .map(|s| CreateService {
                id: ServiceId::new().0,
                business_id: business_id.0,
                name: s.name.trim().to_string(),
                description: non_empty(s.description),
                price_cents: s.price_cents,
                duration_minutes: s.duration_minutes,
            })
            .collect();

        let (_, owner_row) = match self
            .registrations
            .create_business_with_owner(business, owner, services)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let err = AuthError::from(e);
                self.compensate(external.id, "register_business", &err).await;
                return Err(err);
            }
        };

        let owner = owner_row.to_identity()?;
        tracing::info!(%business_id, owner_id = %owner.user_id, "Business registered");

        Ok(RegisteredBusiness { business_id, owner })
    }

    /// Add a STAFF user to the actor's business.
    ///
    /// Only ADMIN and SUPER_ADMIN callers that belong to a business may do this.
    #[tracing::instrument(skip(self, actor, input), fields(actor_id = %actor.user_id))]
    pub async fn add_staff_member(
        &self,
        actor: &Identity,
        input: NewStaffMember,
    ) -> Result<Identity, AuthError> {
        if !actor.role.can_manage_staff() {
            return Err(AuthError::Forbidden);
        }
        let business_id = actor.business_id.ok_or(AuthError::Forbidden)?;

        validate_staff(&input)?;

        // Phase 1: identity store
        let external = self
            .provider
            .create_identity(&input.email, &input.password)
            .await?;

        // Phase 2: local user
        let user = CreateUser {
            id: external.id.0,
            email: external.email.clone(),
            name: Some(input.name.trim().to_string()),
            phone: non_empty(input.phone),
            role: Role::Staff.as_str().to_string(),
            business_id: Some(business_id.0),
        };

        let row = match self.users.create(user).await {
            Ok(row) => row,
            Err(e) => {
                let err = AuthError::from(e);
                self.compensate(external.id, "add_staff_member", &err).await;
                return Err(err);
            }
        };

        let staff = row.to_identity()?;
        tracing::info!(%business_id, staff_id = %staff.user_id, "Staff member added");
        Ok(staff)
    }

    async fn compensate(&self, user_id: UserId, operation: &'static str, cause: &AuthError) {
        match self.provider.delete_identity(user_id).await {
            Ok(()) => {
                tracing::warn!(
                    %user_id,
                    operation,
                    cause = %cause,
                    "Rolled back identity store user after local write failed"
                );
            }
            Err(e) => {
                tracing::error!(
                    %user_id,
                    operation,
                    cause = %cause,
                    error = %e,
                    "compensation_failed: identity store user left without a local record"
                );
            }
        }
    }
}

impl std::fmt::Debug for RegistrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationService").finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_password(password: &str, problems: &mut Vec<String>) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
}

fn finish(problems: Vec<String>) -> Result<(), AuthError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(problems.join("; ")))
    }
}

fn validate_business(input: &RegisterBusiness) -> Result<(), AuthError> {
    let mut problems = Vec::new();

    let name_len = input.business_name.trim().chars().count();
    if !(2..=100).contains(&name_len) {
        problems.push("business name must be 2-100 characters".to_string());
    }
    if !is_valid_slug(&input.slug) {
        problems.push("slug may only contain lowercase letters, digits and dashes".to_string());
    }
    if !is_valid_email(&input.business_email) {
        problems.push("business email is invalid".to_string());
    }
    if input.business_phone.trim().is_empty() {
        problems.push("business phone is required".to_string());
    }
    if input.owner_name.trim().is_empty() {
        problems.push("owner name is required".to_string());
    }
    if !is_valid_email(&input.owner_email) {
        problems.push("owner email is invalid".to_string());
    }
    check_password(&input.owner_password, &mut problems);

    for service in &input.services {
        if service.name.trim().is_empty() {
            problems.push("service name is required".to_string());
        }
        if service.price_cents <= 0 {
            problems.push(format!("price of '{}' must be positive", service.name));
        }
        if service.duration_minutes <= 0 {
            problems.push(format!("duration of '{}' must be positive", service.name));
        }
    }

    finish(problems)
}

fn validate_staff(input: &NewStaffMember) -> Result<(), AuthError> {
    let mut problems = Vec::new();
    if input.name.trim().is_empty() {
        problems.push("name is required".to_string());
    }
    if !is_valid_email(&input.email) {
        problems.push("email is invalid".to_string());
    }
    check_password(&input.password, &mut problems);
    finish(problems)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_validation_collects_all_problems() {
        let err = validate_staff(&NewStaffMember {
            name: " ".into(),
            email: "nope".into(),
            password: "short".into(),
            phone: None,
        })
        .unwrap_err();
        let AuthError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("name is required"));
        assert!(message.contains("email is invalid"));
        assert!(message.contains("at least 8"));
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
