//! Roles and authenticated identities

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{BusinessId, ParseError, UserId};

/// Role of a local application user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Public customer (default for new accounts)
    #[default]
    Customer,
    /// Business staff member
    Staff,
    /// Business administrator
    Admin,
    /// Platform-wide administrator
    SuperAdmin,
}

impl Role {
    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Whether this role may view and change bookings
    pub fn can_manage_bookings(&self) -> bool {
        matches!(self, Self::Staff | Self::Admin | Self::SuperAdmin)
    }

    /// Whether this role may manage the staff of a business
    pub fn can_manage_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "STAFF" => Ok(Self::Staff),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            other => Err(ParseError::InvalidRole(other.to_string())),
        }
    }
}

/// The authenticated caller, as resolved from a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub business_id: Option<BusinessId>,
}

impl Identity {
    /// Create a new identity
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            business_id: None,
        }
    }

    /// Attach the business this identity belongs to
    #[must_use]
    pub fn with_business(mut self, business_id: BusinessId) -> Self {
        self.business_id = Some(business_id);
        self
    }

    /// Business the caller's queries are restricted to.
    ///
    /// `None` means unrestricted, which only a super admin without a
    /// business of their own gets.
    pub fn business_scope(&self) -> Option<BusinessId> {
        self.business_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Customer, Role::Staff, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_rejects_lowercase() {
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_booking_management_roles() {
        assert!(!Role::Customer.can_manage_bookings());
        assert!(Role::Staff.can_manage_bookings());
        assert!(Role::Admin.can_manage_bookings());
        assert!(Role::SuperAdmin.can_manage_bookings());
        assert!(!Role::Staff.can_manage_staff());
    }

    #[test]
    fn test_role_serde_format() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
    }
}
