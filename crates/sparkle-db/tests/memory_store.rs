//! Behavioural tests for the in-memory repositories.
//!
//! These pin down the query semantics the Postgres implementation provides
//! (filters, ordering, soft deletion, constraint errors) so services tested
//! against the memory store see the same behaviour.

use chrono::{Duration, TimeZone, Utc};
use sparkle_db::memory::MemoryStore;
use sparkle_db::*;
use uuid::Uuid;

fn business(slug: &str) -> CreateBusiness {
    CreateBusiness {
        id: Uuid::new_v4(),
        name: format!("Business {slug}"),
        slug: slug.to_string(),
        email: format!("{slug}@example.com"),
        phone: "+1 555 0100".into(),
        address: None,
        description: None,
    }
}

fn owner(email: &str, business_id: Uuid) -> CreateUser {
    CreateUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: Some("Owner".into()),
        phone: None,
        role: "ADMIN".into(),
        business_id: Some(business_id),
    }
}

fn booking(business_id: Uuid, name: &str, code: &str, day: u32) -> CreateBooking {
    CreateBooking {
        id: Uuid::new_v4(),
        business_id,
        service_id: None,
        service_name: "Basic House Cleaning".into(),
        service_price_cents: 12000,
        service_duration_minutes: 120,
        customer_name: name.to_string(),
        customer_email: format!("{}@example.com", name.to_lowercase()),
        customer_phone: "+1 (555) 010-0000".into(),
        customer_address: "1 Main Street".into(),
        appointment_date: Utc.with_ymd_and_hms(2030, 1, day, 9, 0, 0).unwrap(),
        appointment_time: "09:00".into(),
        duration_minutes: 120,
        total_price_cents: 12000,
        notes: None,
        status: "PENDING".into(),
        confirmation_code: code.to_string(),
        user_id: None,
    }
}

async fn seeded() -> (MemoryStore, Repositories, Uuid) {
    let store = MemoryStore::new();
    let repos = Repositories::in_memory(store.clone());
    let biz = business("sparkle-clean");
    let biz_id = biz.id;
    repos
        .registrations
        .create_business_with_owner(biz, owner("admin@example.com", biz_id), vec![])
        .await
        .unwrap();
    (store, repos, biz_id)
}

#[tokio::test]
async fn test_duplicate_confirmation_code_is_unique_violation() {
    let (_, repos, biz) = seeded().await;
    repos.bookings.create(booking(biz, "Ada", "BK-1-AAAAAAA", 1)).await.unwrap();

    let err = repos
        .bookings
        .create(booking(biz, "Bob", "BK-1-AAAAAAA", 2))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn test_unknown_business_is_foreign_key_violation() {
    let (_, repos, _) = seeded().await;
    let err = repos
        .bookings
        .create(booking(Uuid::new_v4(), "Ada", "BK-1-BBBBBBB", 1))
        .await
        .unwrap_err();
    assert!(err.is_foreign_key_violation());
}

#[tokio::test]
async fn test_search_matches_any_field_case_insensitively() {
    let (_, repos, biz) = seeded().await;
    repos.bookings.create(booking(biz, "Ada Lovelace", "BK-1-ADA0001", 1)).await.unwrap();
    repos.bookings.create(booking(biz, "Bob Stone", "BK-1-BOB0001", 2)).await.unwrap();

    for (needle, expected) in [("ada", 1), ("LOVELACE", 1), ("bk-1-ada", 1), ("stone@", 1), ("zzz", 0)] {
        let filter = BookingFilter {
            search: Some(needle.to_string()),
            ..Default::default()
        };
        let count = repos.bookings.count(&filter).await.unwrap();
        assert_eq!(count, expected, "needle {needle}");
    }

    let both = BookingFilter {
        search: Some("010-0000".into()),
        ..Default::default()
    };
    assert_eq!(repos.bookings.count(&both).await.unwrap(), 2);
}

#[tokio::test]
async fn test_soft_deleted_bookings_are_invisible() {
    let (store, repos, biz) = seeded().await;
    let row = repos.bookings.create(booking(biz, "Ada", "BK-1-DEL0001", 1)).await.unwrap();
    store.update_booking(row.id, |b| b.deleted_at = Some(Utc::now()));

    assert!(repos.bookings.find_by_id(row.id).await.unwrap().is_none());
    assert_eq!(repos.bookings.count(&BookingFilter::default()).await.unwrap(), 0);
    assert!(repos
        .bookings
        .update_status(row.id, "CONFIRMED", None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_list_orders_and_pages() {
    let (_, repos, biz) = seeded().await;
    for day in 1..=5 {
        repos
            .bookings
            .create(booking(biz, "Ada", &format!("BK-{day}-PAGE000"), day))
            .await
            .unwrap();
    }

    let query = BookingQuery {
        filter: BookingFilter::default(),
        sort: BookingSort::AppointmentDateDesc,
        offset: 1,
        limit: 2,
    };
    let page = repos.bookings.list(&query).await.unwrap();
    let days: Vec<u32> = page
        .iter()
        .map(|b| chrono::Datelike::day(&b.appointment_date))
        .collect();
    assert_eq!(days, vec![4, 3]);
}

#[tokio::test]
async fn test_date_range_is_inclusive() {
    let (_, repos, biz) = seeded().await;
    for day in 1..=5 {
        repos
            .bookings
            .create(booking(biz, "Ada", &format!("BK-{day}-RANGE00"), day))
            .await
            .unwrap();
    }
    let filter = BookingFilter {
        date_from: Some(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap()),
        date_to: Some(Utc.with_ymd_and_hms(2030, 1, 4, 9, 0, 0).unwrap()),
        ..Default::default()
    };
    assert_eq!(repos.bookings.count(&filter).await.unwrap(), 3);
}

#[tokio::test]
async fn test_completed_at_written_once() {
    let (_, repos, biz) = seeded().await;
    let row = repos.bookings.create(booking(biz, "Ada", "BK-1-DONE000", 1)).await.unwrap();

    let first = Utc::now();
    let done = repos
        .bookings
        .update_status(row.id, "COMPLETED", Some(first))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.completed_at, Some(first));

    let reopened = repos
        .bookings
        .update_status(row.id, "PENDING", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.status, "PENDING");
    assert_eq!(reopened.completed_at, Some(first));

    let again = repos
        .bookings
        .update_status(row.id, "COMPLETED", Some(first + Duration::hours(1)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.completed_at, Some(first));
}

#[tokio::test]
async fn test_stats_counts_by_status() {
    let (_, repos, biz) = seeded().await;
    let a = repos.bookings.create(booking(biz, "Ada", "BK-1-STAT001", 1)).await.unwrap();
    let b = repos.bookings.create(booking(biz, "Bob", "BK-1-STAT002", 2)).await.unwrap();
    repos.bookings.create(booking(biz, "Cy", "BK-1-STAT003", 3)).await.unwrap();
    repos.bookings.update_status(a.id, "COMPLETED", Some(Utc::now())).await.unwrap();
    repos.bookings.update_status(b.id, "CONFIRMED", None).await.unwrap();

    let now = Utc::now();
    let stats = repos
        .bookings
        .stats(biz, now - Duration::hours(1), now - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.revenue_cents, 12000);
    assert_eq!(stats.created_today, 3);
}

#[tokio::test]
async fn test_registration_failure_leaves_no_business() {
    let store = MemoryStore::new();
    let repos = Repositories::in_memory(store.clone());
    store.fail_user_writes(true);

    let biz = business("half-made");
    let biz_id = biz.id;
    let result = repos
        .registrations
        .create_business_with_owner(biz, owner("owner@example.com", biz_id), vec![])
        .await;

    assert!(result.is_err());
    assert_eq!(store.business_count(), 0);
    assert_eq!(repos.businesses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_first_active_skips_inactive_and_deleted() {
    let store = MemoryStore::new();
    let repos = Repositories::in_memory(store.clone());
    let now = Utc::now();

    let mut inactive = BusinessRow {
        id: Uuid::new_v4(),
        name: "Old".into(),
        slug: "old".into(),
        email: "old@example.com".into(),
        phone: "1".into(),
        address: None,
        description: None,
        is_active: false,
        deleted_at: None,
        created_at: now - Duration::days(3),
        updated_at: now,
    };
    store.insert_business(inactive.clone());

    inactive.id = Uuid::new_v4();
    inactive.slug = "gone".into();
    inactive.is_active = true;
    inactive.deleted_at = Some(now);
    store.insert_business(inactive.clone());

    assert!(repos.businesses.find_first_active().await.unwrap().is_none());

    inactive.id = Uuid::new_v4();
    inactive.slug = "live".into();
    inactive.deleted_at = None;
    store.insert_business(inactive.clone());

    let found = repos.businesses.find_first_active().await.unwrap().unwrap();
    assert_eq!(found.slug, "live");
}
