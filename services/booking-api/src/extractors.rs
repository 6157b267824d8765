//! Axum extractors for callers, client addresses and JSON bodies

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRef, FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use sparkle_types::Identity;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Client address
// ============================================================================

/// Best-effort client address for rate limiting.
///
/// Taken from the first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// peer socket address. `None` when none of them is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    /// Identifier to count against, with a fallback for unknown clients
    pub fn or(&self, fallback: &str) -> String {
        self.0.clone().unwrap_or_else(|| fallback.to_string())
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(Self(client_ip(&parts.headers).or(peer)))
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded.or_else(real_ip).map(str::to_string)
}

// ============================================================================
// Session token
// ============================================================================

/// Raw session token from `Authorization: Bearer` or the session cookie
#[derive(Debug, Clone, Default)]
pub struct SessionToken(pub Option<String>);

impl<S> FromRequestParts<S> for SessionToken
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(Self(extract_token(
            &parts.headers,
            &app_state.auth().cookie_name,
        )))
    }
}

/// Extract token from Authorization header or session cookie
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    // Try Authorization header first (Bearer token)
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    // Try session cookie
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == cookie_name && !value.is_empty()).then(|| value.to_string())
    })
}

// ============================================================================
// Authenticated caller
// ============================================================================

/// Authenticated caller extracted from the session token
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub identity: Identity,
    pub token: String,
}

/// Rejection for requests that need a signed-in caller
#[derive(Debug)]
pub enum AuthRejection {
    /// Browser navigation: send to the login page
    LoginRedirect { next: String },
    /// API client: JSON error envelope
    Api(ApiError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRedirect { next } => {
                Redirect::to(&login_location(&next)).into_response()
            }
            Self::Api(err) => err.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_token(&parts.headers, &app_state.auth().cookie_name);

        let resolved = app_state
            .gateway
            .current_identity(token.as_deref())
            .await
            .map_err(|e| AuthRejection::Api(e.into()))?;

        match (resolved, token) {
            (Some(identity), Some(token)) => Ok(Self { identity, token }),
            _ if wants_html(&parts.headers) => Err(AuthRejection::LoginRedirect {
                next: parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string()),
            }),
            _ => Err(AuthRejection::Api(ApiError::Unauthorized)),
        }
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Login page URL that returns to `next` afterwards
fn login_location(next: &str) -> String {
    format!("/admin/login?next={}", urlencoding::encode(next))
}

// ============================================================================
// JSON bodies
// ============================================================================

/// `Json` with rejections rendered in the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T> IntoResponse for ApiJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
