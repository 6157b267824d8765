//! API request/response types

use serde::{Deserialize, Serialize};

/// Standard API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error information (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Create an error response
    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message: None,
        }
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// API error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code (e.g., `VALIDATION_ERROR`, `BOOKING_NOT_FOUND`)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Normalized page request (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Default page size
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Hard cap on page size
    pub const MAX_LIMIT: u32 = 50;

    /// Normalize raw query values.
    ///
    /// Pages below 1 clamp to 1. A missing or non-positive limit falls back
    /// to the default, and anything above the cap is clamped to it.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1).min(i64::from(u32::MAX)) as u32;
        let limit = match limit {
            Some(l) if l >= 1 => l.min(i64::from(Self::MAX_LIMIT)) as u32,
            _ => Self::DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Row offset for database queries
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned with a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    /// Compute pagination metadata for a request and a total row count
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        let total_pages = total.div_ceil(limit).min(u64::from(u32::MAX)) as u32;
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(Some(0), Some(500)), PageRequest { page: 1, limit: 50 });
        assert_eq!(PageRequest::new(Some(-3), Some(0)), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(4), Some(-1)).limit, 10);
    }

    #[test]
    fn test_page_info_23_rows() {
        let info = PageInfo::new(PageRequest::new(Some(3), Some(10)), 23);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next);
        assert!(info.has_prev);

        let first = PageInfo::new(PageRequest::new(Some(1), Some(10)), 23);
        assert!(first.has_next);
        assert!(!first.has_prev);
    }

    #[test]
    fn test_page_info_empty() {
        let info = PageInfo::new(PageRequest::default(), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn test_page_info_serializes_camel_case() {
        let json = serde_json::to_value(PageInfo::new(PageRequest::default(), 5)).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["hasNext"], false);
        assert_eq!(json["hasPrev"], false);
    }

    #[test]
    fn test_error_envelope_shape() {
        let resp: ApiResponse<()> = ApiResponse::error(ApiError::new("NOT_FOUND", "missing"));
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json.get("data").is_none());
    }

    proptest! {
        #[test]
        fn prop_limit_always_within_bounds(page in any::<Option<i64>>(), limit in any::<Option<i64>>()) {
            let req = PageRequest::new(page, limit);
            prop_assert!(req.page >= 1);
            prop_assert!(req.limit >= 1 && req.limit <= PageRequest::MAX_LIMIT);
        }

        #[test]
        fn prop_total_pages_covers_total(total in 0u64..100_000, limit in 1i64..=50) {
            let req = PageRequest::new(Some(1), Some(limit));
            let info = PageInfo::new(req, total);
            let capacity = u64::from(info.total_pages) * u64::from(req.limit);
            prop_assert!(capacity >= total);
            prop_assert!(capacity < total + u64::from(req.limit));
        }
    }
}
