//! Booking handlers

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sparkle_booking_core::{validate_json, BookingError, BookingListQuery};
use sparkle_types::{ApiResponse, BookingId, BookingStatus};
use tracing::instrument;

use crate::error::{apply_rate_limit_headers, ApiError, ApiResult};
use crate::extractors::{ApiJson, ClientIp, CurrentIdentity};
use crate::handlers::shared::{enforce_rate_limit, timed};
use crate::handlers::views::{BookingListView, BookingView};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings
///
/// Public booking form submission. Rate limited per client before the body
/// is looked at.
#[instrument(skip_all, fields(client = ?client.0))]
pub async fn create_booking(
    State(state): State<AppState>,
    client: ClientIp,
    body: Result<ApiJson<serde_json::Value>, ApiError>,
) -> ApiResult<Response> {
    timed("create_booking", async {
        let decision = enforce_rate_limit(
            &state.booking_limiter,
            "booking",
            &client.or("anonymous"),
            state.limits().booking,
            "Too many booking attempts. Please try again later.",
        )?;

        let ApiJson(request) = body?;
        let validated = validate_json(&request, Utc::now()).map_err(BookingError::Validation)?;
        let confirmation = state.bookings.create_booking(validated).await?;

        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(
            booking_id = %confirmation.id,
            code = %confirmation.confirmation_code,
            "Booking created"
        );

        let body = ApiResponse::success(confirmation).with_message("Booking created successfully");
        let mut response = (StatusCode::CREATED, Json(body)).into_response();
        apply_rate_limit_headers(&mut response, &decision);
        Ok::<_, ApiError>(response)
    })
    .await
}

/// GET /api/bookings
///
/// Staff listing with filters, search and pagination.
#[instrument(skip_all, fields(actor_id = %caller.identity.user_id))]
pub async fn list_bookings(
    State(state): State<AppState>,
    caller: CurrentIdentity,
    client: ClientIp,
    Query(raw): Query<BookingListQuery>,
) -> ApiResult<Response> {
    timed("list_bookings", async {
        if !caller.identity.role.can_manage_bookings() {
            return Err(ApiError::from(BookingError::Unauthorized));
        }

        let decision = enforce_rate_limit(
            &state.admin_limiter,
            "admin",
            &client.or("unknown"),
            state.limits().admin,
            "Too many requests. Please try again later.",
        )?;

        let (filters, page, sort) = raw.parse()?;
        let result = state
            .queries
            .list_bookings(&caller.identity, filters, page, sort)
            .await?;

        let body = ApiResponse::success(BookingListView {
            bookings: result.items.into_iter().map(BookingView::from).collect(),
            pagination: result.info,
        });
        let mut response = Json(body).into_response();
        apply_rate_limit_headers(&mut response, &decision);
        Ok::<_, ApiError>(response)
    })
    .await
}

/// GET /api/bookings/{id}
///
/// Public lookup used by the confirmation page.
#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<BookingView>>> {
    timed("get_booking", async {
        let id = BookingId::parse(&id).map_err(|_| BookingError::BookingNotFound)?;
        let details = state.bookings.get_booking(id).await?;

        Ok::<_, ApiError>(Json(
            ApiResponse::success(BookingView::from(details))
                .with_message("Booking details retrieved successfully"),
        ))
    })
    .await
}

/// PATCH /api/bookings/{id}
///
/// Change a booking's status. The caller's role is checked before the ID,
/// the body or the booking itself.
#[instrument(skip(state, caller, body), fields(actor_id = %caller.identity.user_id))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    caller: CurrentIdentity,
    Path(id): Path<String>,
    body: Result<ApiJson<StatusUpdate>, ApiError>,
) -> ApiResult<Json<ApiResponse<BookingView>>> {
    timed("update_booking_status", async {
        if !caller.identity.role.can_manage_bookings() {
            return Err(ApiError::from(BookingError::Unauthorized));
        }

        let id = BookingId::parse(&id).map_err(|_| BookingError::BookingNotFound)?;
        let ApiJson(update) = body?;
        let raw_status = update.status.unwrap_or_default();
        let status: BookingStatus = raw_status
            .parse()
            .map_err(|_| BookingError::InvalidStatus(raw_status.clone()))?;

        let details = state
            .bookings
            .update_status(id, status, &caller.identity)
            .await?;

        Ok::<_, ApiError>(Json(
            ApiResponse::success(BookingView::from(details))
                .with_message("Booking status updated successfully"),
        ))
    })
    .await
}

/// PUT and DELETE on booking routes
pub async fn booking_method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}
