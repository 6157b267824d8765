//! Admin dashboard and staff management handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use sparkle_auth_core::NewStaffMember;
use sparkle_booking_core::DashboardStats;
use sparkle_types::{ApiResponse, Identity};
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, CurrentIdentity};
use crate::handlers::shared::timed;
use crate::state::AppState;

/// GET /api/admin/dashboard
#[instrument(skip_all, fields(actor_id = %caller.identity.user_id))]
pub async fn dashboard(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> ApiResult<Json<ApiResponse<DashboardStats>>> {
    timed("dashboard", async {
        let stats = state
            .queries
            .dashboard_stats(&caller.identity, Utc::now())
            .await
            .map_err(ApiError::business_lookup)?;
        Ok::<_, ApiError>(Json(ApiResponse::success(stats)))
    })
    .await
}

/// POST /api/admin/staff
#[instrument(skip_all, fields(actor_id = %caller.identity.user_id))]
pub async fn add_staff(
    State(state): State<AppState>,
    caller: CurrentIdentity,
    ApiJson(input): ApiJson<NewStaffMember>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Identity>>)> {
    timed("add_staff", async {
        let staff = state
            .registration
            .add_staff_member(&caller.identity, input)
            .await?;
        Ok::<_, ApiError>((
            StatusCode::CREATED,
            Json(ApiResponse::success(staff).with_message("Staff member added")),
        ))
    })
    .await
}
