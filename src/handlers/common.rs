use crate::errors::{ApiError, ServiceError};
use crate::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::IntoParams;
use validator::Validate;

/// Standard success response, wrapped in the `ApiResponse` envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response, wrapped in the `ApiResponse` envelope
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Parses an optional query-string enum, naming the offending parameter in
/// the 400 it produces.
pub fn parse_enum_param<T: FromStr>(value: Option<&str>, name: &str) -> Result<Option<T>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => T::from_str(raw).map(Some).map_err(|_| {
            ApiError::ValidationError(format!("Invalid value '{}' for parameter '{}'", raw, name))
        }),
    }
}

/// Pagination parameters for list operations. Page numbering starts at 1;
/// limits above the configured maximum are clamped, not rejected.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(page, limit, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 20, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 20, 21).total_pages, 2);
        assert_eq!(PaginationMeta::new(1, 7, 13).total_pages, 2);
    }

    #[test]
    fn enum_params_parse_or_reject() {
        use crate::entities::stock_alert::AlertStatus;

        let parsed: Option<AlertStatus> = parse_enum_param(Some("active"), "status").unwrap();
        assert_eq!(parsed, Some(AlertStatus::Active));

        let missing: Option<AlertStatus> = parse_enum_param(None, "status").unwrap();
        assert_eq!(missing, None);

        let err = parse_enum_param::<AlertStatus>(Some("archived"), "status").unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
