//! Authentication handlers (register, login, logout, me)

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sparkle_auth_core::{RegisterBusiness, RegisteredBusiness};
use sparkle_types::{ApiResponse, Identity};
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ClientIp, CurrentIdentity, SessionToken};
use crate::handlers::shared::timed;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: Identity,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
///
/// Register a business together with its administrator.
#[instrument(skip_all, fields(slug = %input.slug))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterBusiness>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RegisteredBusiness>>)> {
    timed("register_business", async {
        let registered = state.registration.register_business(input).await?;
        Ok::<_, ApiError>((
            StatusCode::CREATED,
            Json(ApiResponse::success(registered).with_message("Business registered successfully")),
        ))
    })
    .await
}

/// POST /api/auth/login
///
/// Exchange credentials for a session cookie.
#[instrument(skip_all, fields(client = ?client.0))]
pub async fn login(
    State(state): State<AppState>,
    client: ClientIp,
    headers: HeaderMap,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let outcome = timed("login", async {
        Ok::<_, ApiError>(
            state
                .gateway
                .login(&req.email, &req.password, client.0.clone(), user_agent)
                .await?,
        )
    })
    .await?;

    let cookie = state.auth().session_cookie(&outcome.session.token);
    let body = ApiResponse::success(LoginResponse {
        user: outcome.identity,
        expires_at: outcome.session.expires_at,
    });

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/auth/logout
///
/// Revoke the current session and clear the cookie. Succeeds without a
/// session too, so a stale browser can always log out.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = token {
        state.gateway.logout(&token).await?;
    }

    let cookie = state.auth().clear_cookie();
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(()).with_message("Logged out")),
    ))
}

/// GET /api/auth/me
pub async fn me(caller: CurrentIdentity) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::success(caller.identity))
}
