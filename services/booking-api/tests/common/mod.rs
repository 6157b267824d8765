//! Common test utilities for booking-api HTTP tests

#![allow(dead_code)]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use booking_api::{build_router, AppState, Config, RateLimits, SeedConfig};
use chrono::Utc;
use serde_json::Value;
use sparkle_auth_core::{AuthConfig, IdentityProvider, LocalIdentityProvider};
use sparkle_db::memory::MemoryStore;
use sparkle_db::{BusinessRow, Repositories, ServiceRow, UserRow};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";
pub const ADMIN_EMAIL: &str = "sarah@sparkleclean.com";
pub const STAFF_EMAIL: &str = "mike@sparkleclean.com";
pub const CUSTOMER_EMAIL: &str = "carol@example.com";

/// A router over a seeded in-memory store
pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub staff_id: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_limits(RateLimits {
            booking: 5,
            admin: 100,
            window: Duration::from_secs(60),
        })
        .await
    }

    pub async fn with_limits(rate_limits: RateLimits) -> Self {
        let store = MemoryStore::new();
        let business_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();

        store.insert_business(BusinessRow {
            id: business_id,
            name: "SparkleClean Professional Services".into(),
            slug: "sparkle-clean".into(),
            email: "hello@sparkleclean.com".into(),
            phone: "+1-555-CLEAN-01".into(),
            address: Some("123 Main Street, Downtown, NY 10001".into()),
            description: None,
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        store.insert_service(ServiceRow {
            id: service_id,
            business_id,
            name: "Basic House Cleaning".into(),
            description: None,
            price_cents: 12_000,
            duration_minutes: 120,
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });

        let repos = Repositories::in_memory(store.clone());
        let state = AppState::new(&repos, test_config(rate_limits)).unwrap();

        let provider = LocalIdentityProvider::new(repos.identities.clone());
        add_user(&store, &provider, ADMIN_EMAIL, "ADMIN", Some(business_id)).await;
        let staff_id = add_user(&store, &provider, STAFF_EMAIL, "STAFF", Some(business_id)).await;
        add_user(&store, &provider, CUSTOMER_EMAIL, "CUSTOMER", None).await;

        Self {
            store,
            state,
            business_id,
            service_id,
            staff_id,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), None)
    }

    /// Send one request through a fresh router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// Log in and return the `name=value` cookie pair
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                &serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// A valid public booking form body for the seeded service
    pub fn booking_body(&self) -> Value {
        serde_json::json!({
            "customerName": "Ada Lovelace",
            "customerEmail": "ada@example.com",
            "customerPhone": "+1 (555) 123-4567",
            "service": self.service_id.to_string(),
            "date": future_date(30),
            "time": "10:30",
            "address": "12 Analytical Row, London",
            "notes": "Side door"
        })
    }
}

/// `YYYY-MM-DD` a number of days from today
pub fn future_date(days: i64) -> String {
    (Utc::now() + chrono::Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub fn test_config(rate_limits: RateLimits) -> Config {
    Config {
        http_port: 0,
        database_url: "memory://".into(),
        auth: AuthConfig::try_new("test-session-secret-that-is-long-enough")
            .unwrap()
            .with_cookie_secure(false),
        request_timeout: Duration::from_secs(5),
        rate_limits,
        strict_status_transitions: false,
        metrics_enabled: false,
        seed: SeedConfig {
            enabled: false,
            admin_email: "sarah@sparkleclean.com".into(),
            admin_password: None,
        },
    }
}

async fn add_user(
    store: &MemoryStore,
    provider: &LocalIdentityProvider,
    email: &str,
    role: &str,
    business_id: Option<Uuid>,
) -> Uuid {
    let external = provider.create_identity(email, PASSWORD).await.unwrap();
    store.insert_user(UserRow {
        id: external.id.0,
        email: external.email,
        name: Some("Test User".into()),
        phone: None,
        role: role.into(),
        business_id,
        is_active: true,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });
    external.id.0
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
