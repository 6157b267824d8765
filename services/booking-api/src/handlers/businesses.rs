//! Public business pages

use axum::extract::{Path, State};
use axum::Json;
use sparkle_types::ApiResponse;
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::handlers::views::BusinessView;
use crate::state::AppState;

/// GET /api/businesses/{slug}
#[instrument(skip(state))]
pub async fn get_business(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<BusinessView>>> {
    let profile = state
        .catalog
        .business_by_slug(&slug)
        .await
        .map_err(ApiError::business_lookup)?;

    Ok(Json(ApiResponse::success(BusinessView::from(profile))))
}
