//! Admin booking queries

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sparkle_db::{
    BookingFilter, BookingQuery, BookingRepository, BookingSort, BusinessRepository, Repositories,
};
use sparkle_types::{
    Booking, BookingDetails, BookingStatus, BusinessContact, Identity, Page, PageInfo,
    PageRequest, Role, ServiceId,
};
use uuid::Uuid;

use crate::lifecycle::contact_of;
use crate::validation::{is_date_only, parse_date};
use crate::BookingError;

/// Raw list parameters as they arrive in a query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Typed booking filters; every present condition must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub service_id: Option<ServiceId>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

/// Booking list order, newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    AppointmentDate,
    CreatedAt,
}

impl SortOrder {
    /// Parse a `sort` parameter; unknown values fall back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("createdAt") => Self::CreatedAt,
            _ => Self::AppointmentDate,
        }
    }

    fn to_db(self) -> BookingSort {
        match self {
            Self::AppointmentDate => BookingSort::AppointmentDateDesc,
            Self::CreatedAt => BookingSort::CreatedAtDesc,
        }
    }
}

impl BookingListQuery {
    /// Turn raw parameters into filters, a page request and a sort order.
    ///
    /// Page and limit are lenient: anything unparseable falls back to the
    /// defaults. Status, service and dates must be well-formed when present.
    pub fn parse(&self) -> Result<(BookingFilters, PageRequest, SortOrder), BookingError> {
        let page = PageRequest::new(lenient_int(&self.page), lenient_int(&self.limit));

        let status = present(&self.status)
            .map(|raw| {
                raw.parse::<BookingStatus>()
                    .map_err(|_| BookingError::InvalidStatus(raw.to_string()))
            })
            .transpose()?;

        let service_id = present(&self.service)
            .map(|raw| {
                ServiceId::parse(raw).map_err(|_| BookingError::InvalidParameter {
                    field: "service",
                    message: "not a valid service ID".to_string(),
                })
            })
            .transpose()?;

        let date_from = present(&self.date_from)
            .map(|raw| parse_date(raw).ok_or_else(|| invalid_date("dateFrom")))
            .transpose()?;

        let date_to = present(&self.date_to)
            .map(|raw| {
                let parsed = parse_date(raw).ok_or_else(|| invalid_date("dateTo"))?;
                // A bare date covers that whole day
                Ok::<_, BookingError>(if is_date_only(raw) {
                    parsed + Duration::days(1) - Duration::microseconds(1)
                } else {
                    parsed
                })
            })
            .transpose()?;

        let filters = BookingFilters {
            status,
            service_id,
            date_from,
            date_to,
            search: present(&self.search).map(str::to_string),
        };

        Ok((filters, page, SortOrder::parse(self.sort.as_deref())))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn lenient_int(value: &Option<String>) -> Option<i64> {
    present(value).and_then(|v| v.parse().ok())
}

fn invalid_date(field: &'static str) -> BookingError {
    BookingError::InvalidParameter {
        field,
        message: "expected YYYY-MM-DD or an RFC 3339 timestamp".to_string(),
    }
}

/// Read-side queries for the admin surface
#[derive(Clone)]
pub struct AdminQueryService {
    pub(crate) businesses: Arc<dyn BusinessRepository>,
    pub(crate) bookings: Arc<dyn BookingRepository>,
}

impl AdminQueryService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            businesses: repos.businesses.clone(),
            bookings: repos.bookings.clone(),
        }
    }

    /// Business filter for `actor`, or `Unauthorized`.
    ///
    /// `Ok(None)` means unrestricted, which only a SUPER_ADMIN without a
    /// business of their own gets.
    pub(crate) fn scope_for(actor: &Identity) -> Result<Option<Uuid>, BookingError> {
        if !actor.role.can_manage_bookings() {
            return Err(BookingError::Unauthorized);
        }
        match actor.business_scope() {
            Some(business_id) => Ok(Some(business_id.0)),
            None if actor.role == Role::SuperAdmin => Ok(None),
            None => Err(BookingError::Unauthorized),
        }
    }

    /// One page of bookings visible to `actor`
    #[tracing::instrument(skip(self, actor, filters), fields(actor_id = %actor.user_id))]
    pub async fn list_bookings(
        &self,
        actor: &Identity,
        filters: BookingFilters,
        page: PageRequest,
        sort: SortOrder,
    ) -> Result<Page<BookingDetails>, BookingError> {
        let business_id = Self::scope_for(actor)?;

        let query = BookingQuery {
            filter: BookingFilter {
                business_id,
                status: filters.status.map(|s| s.as_str().to_string()),
                service_id: filters.service_id.map(|id| id.0),
                date_from: filters.date_from,
                date_to: filters.date_to,
                search: filters.search,
            },
            sort: sort.to_db(),
            offset: page.offset(),
            limit: u64::from(page.limit),
        };

        let (rows, total) = tokio::try_join!(
            self.bookings.list(&query),
            self.bookings.count(&query.filter)
        )?;

        let mut contacts: HashMap<Uuid, BusinessContact> = HashMap::new();
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            if !contacts.contains_key(&row.business_id) {
                let contact = self
                    .businesses
                    .find_by_id(row.business_id)
                    .await?
                    .map(contact_of)
                    .ok_or(BookingError::BusinessNotFound)?;
                contacts.insert(row.business_id, contact);
            }
            let business = contacts[&row.business_id].clone();
            items.push(BookingDetails {
                booking: Booking::try_from(row)?,
                business,
            });
        }

        tracing::debug!(total, returned = items.len(), "Listed bookings");

        Ok(Page {
            items,
            info: PageInfo::new(page, total),
        })
    }
}

impl std::fmt::Debug for AdminQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminQueryService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sparkle_types::{BusinessId, UserId};

    fn query() -> BookingListQuery {
        BookingListQuery::default()
    }

    #[test]
    fn test_defaults() {
        let (filters, page, sort) = query().parse().unwrap();
        assert_eq!(filters, BookingFilters::default());
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(sort, SortOrder::AppointmentDate);
    }

    #[test]
    fn test_lenient_paging() {
        let mut q = query();
        q.page = Some("0".into());
        q.limit = Some("abc".into());
        let (_, page, _) = q.parse().unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 10 });

        q.page = Some("3".into());
        q.limit = Some("500".into());
        let (_, page, _) = q.parse().unwrap();
        assert_eq!(page, PageRequest { page: 3, limit: 50 });
    }

    #[test]
    fn test_status_must_be_known() {
        let mut q = query();
        q.status = Some("DONE".into());
        assert!(matches!(q.parse(), Err(BookingError::InvalidStatus(_))));

        q.status = Some("NO_SHOW".into());
        assert_eq!(q.parse().unwrap().0.status, Some(BookingStatus::NoShow));
    }

    #[test]
    fn test_date_only_upper_bound_covers_day() {
        let mut q = query();
        q.date_from = Some("2026-03-10".into());
        q.date_to = Some("2026-03-10".into());
        let (filters, _, _) = q.parse().unwrap();

        let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(filters.date_from, Some(day));
        let to = filters.date_to.unwrap();
        assert!(to > Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_timestamp_upper_bound_is_exact() {
        let mut q = query();
        q.date_to = Some("2026-03-10T08:00:00Z".into());
        let (filters, _, _) = q.parse().unwrap();
        assert_eq!(
            filters.date_to,
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_bad_service_and_dates() {
        let mut q = query();
        q.service = Some("nope".into());
        assert!(matches!(
            q.parse(),
            Err(BookingError::InvalidParameter { field: "service", .. })
        ));

        let mut q = query();
        q.date_from = Some("yesterday".into());
        assert!(matches!(
            q.parse(),
            Err(BookingError::InvalidParameter { field: "dateFrom", .. })
        ));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut q = query();
        q.search = Some("  ".into());
        q.status = Some(String::new());
        q.sort = Some("createdAt".into());
        let (filters, _, sort) = q.parse().unwrap();
        assert_eq!(filters.search, None);
        assert_eq!(filters.status, None);
        assert_eq!(sort, SortOrder::CreatedAt);
    }

    #[test]
    fn test_scope_rules() {
        let business = BusinessId::new();
        let staff = Identity::new(UserId::new(), "s@x.io", Role::Staff).with_business(business);
        assert_eq!(AdminQueryService::scope_for(&staff).unwrap(), Some(business.0));

        let root = Identity::new(UserId::new(), "r@x.io", Role::SuperAdmin);
        assert_eq!(AdminQueryService::scope_for(&root).unwrap(), None);

        let loose_admin = Identity::new(UserId::new(), "a@x.io", Role::Admin);
        assert!(matches!(
            AdminQueryService::scope_for(&loose_admin),
            Err(BookingError::Unauthorized)
        ));

        let customer = Identity::new(UserId::new(), "c@x.io", Role::Customer);
        assert!(matches!(
            AdminQueryService::scope_for(&customer),
            Err(BookingError::Unauthorized)
        ));
    }
}
