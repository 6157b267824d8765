//! Booking status transitions
//!
//! Every status change goes through a [`TransitionPolicy`]. The default
//! [`Permissive`] policy allows any move, including backwards ones such as
//! COMPLETED → PENDING. [`Strict`] only allows moves forward through the
//! lifecycle.

use std::sync::Arc;

use sparkle_types::BookingStatus;

use crate::BookingError;

/// Decides which status changes are allowed
pub trait TransitionPolicy: Send + Sync + std::fmt::Debug {
    /// Whether a booking may move from `from` to `to`
    fn allows(&self, from: BookingStatus, to: BookingStatus) -> bool;

    /// `Ok` when allowed, [`BookingError::InvalidTransition`] otherwise
    fn check(&self, from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(BookingError::InvalidTransition { from, to })
        }
    }
}

/// Any status may follow any status
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl TransitionPolicy for Permissive {
    fn allows(&self, _from: BookingStatus, _to: BookingStatus) -> bool {
        true
    }
}

/// Forward-only lifecycle. Setting the current status again is a no-op and
/// always allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl Strict {
    /// Statuses reachable from `from`
    pub fn targets(from: BookingStatus) -> &'static [BookingStatus] {
        use BookingStatus::*;
        match from {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[InProgress, Cancelled, NoShow],
            InProgress => &[Completed, Cancelled],
            Completed | Cancelled | NoShow => &[],
        }
    }
}

impl TransitionPolicy for Strict {
    fn allows(&self, from: BookingStatus, to: BookingStatus) -> bool {
        from == to || Self::targets(from).contains(&to)
    }
}

/// Policy selected by the `strict` configuration flag
pub fn policy_for(strict: bool) -> Arc<dyn TransitionPolicy> {
    if strict {
        Arc::new(Strict)
    } else {
        Arc::new(Permissive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_permissive_allows_everything() {
        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                assert!(Permissive.allows(from, to), "{from} -> {to}");
            }
        }
        assert!(Permissive.check(Completed, Pending).is_ok());
    }

    #[test]
    fn test_strict_forward_only() {
        assert!(Strict.allows(Pending, Confirmed));
        assert!(Strict.allows(Confirmed, InProgress));
        assert!(Strict.allows(InProgress, Completed));
        assert!(Strict.allows(Confirmed, NoShow));
        assert!(!Strict.allows(Completed, Pending));
        assert!(!Strict.allows(Pending, Completed));
        assert!(!Strict.allows(Cancelled, Confirmed));
    }

    #[test]
    fn test_strict_same_status_is_allowed() {
        for status in BookingStatus::ALL {
            assert!(Strict.allows(status, status));
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_targets() {
        for status in BookingStatus::ALL {
            assert_eq!(status.is_terminal(), Strict::targets(status).is_empty());
        }
    }

    #[test]
    fn test_policy_for_flag() {
        assert!(policy_for(false).allows(Completed, Pending));
        assert!(matches!(
            policy_for(true).check(Completed, Pending),
            Err(BookingError::InvalidTransition { .. })
        ));
    }
}
