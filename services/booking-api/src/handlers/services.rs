//! Service catalogue handlers

use axum::extract::State;
use axum::Json;
use sparkle_types::ApiResponse;
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentIdentity;
use crate::handlers::views::ServiceView;
use crate::state::AppState;

/// GET /api/services
///
/// Active services of the caller's business.
#[instrument(skip_all, fields(actor_id = %caller.identity.user_id))]
pub async fn list_services(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> ApiResult<Json<ApiResponse<Vec<ServiceView>>>> {
    let business_id = caller
        .identity
        .business_id
        .ok_or(ApiError::BusinessNotFound)?;

    let services = state
        .catalog
        .list_business_services(business_id)
        .await
        .map_err(ApiError::business_lookup)?;

    Ok(Json(
        ApiResponse::success(services.into_iter().map(ServiceView::from).collect())
            .with_message("Services retrieved successfully"),
    ))
}
