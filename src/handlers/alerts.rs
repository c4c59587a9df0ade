use super::common::{
    map_service_error, no_content_response, parse_enum_param, success_response, validate_input,
    PaginatedResponse,
};
use crate::{
    entities::stock_alert::{AlertPriority, AlertStatus, AlertType},
    errors::ApiError,
    handlers::AppState,
    services::alerts::AlertListFilter,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ListAlertsParams {
    /// Lifecycle filter: active, acknowledged, ignored or resolved
    pub status: Option<String>,
    /// Type filter: low_stock, out_of_stock or overdue_replenishment
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    /// Priority filter: low, medium, high or critical
    pub priority: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct IgnoreAlertRequest {
    /// Why this alert can be disregarded
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// Handler functions

/// List alerts
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(ListAlertsParams),
    responses(
        (status = 200, description = "Alerts listed", body = serde_json::Value),
        (status = 400, description = "Invalid filter value", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<ListAlertsParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = AlertListFilter {
        status: parse_enum_param::<AlertStatus>(params.status.as_deref(), "status")?,
        alert_type: parse_enum_param::<AlertType>(params.alert_type.as_deref(), "type")?,
        priority: parse_enum_param::<AlertPriority>(params.priority.as_deref(), "priority")?,
        page: params.page,
        limit: params.limit,
    };

    let page = state
        .services
        .alerts
        .list_alerts(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        page.alerts,
        page.page,
        page.limit,
        page.total,
    )))
}

/// Get an alert by ID
#[utoipa::path(
    get,
    path = "/api/v1/alerts/{id}",
    params(
        ("id" = Uuid, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert fetched", body = serde_json::Value),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let alert = state
        .services
        .alerts
        .get_alert(alert_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(alert))
}

/// Acknowledge an alert
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/acknowledge",
    params(
        ("id" = Uuid, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert acknowledged", body = serde_json::Value),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Alert is in a terminal state", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let alert = state
        .services
        .alerts
        .acknowledge_alert(alert_id)
        .await
        .map_err(map_service_error)?;

    info!("Alert acknowledged: {}", alert_id);

    Ok(success_response(alert))
}

/// Ignore an alert
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/ignore",
    request_body = IgnoreAlertRequest,
    params(
        ("id" = Uuid, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert ignored", body = serde_json::Value),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Alert is in a terminal state", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn ignore_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
    Json(payload): Json<IgnoreAlertRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let alert = state
        .services
        .alerts
        .ignore_alert(alert_id, payload.reason)
        .await
        .map_err(map_service_error)?;

    info!("Alert ignored: {}", alert_id);

    Ok(success_response(alert))
}

/// Delete an alert
#[utoipa::path(
    delete,
    path = "/api/v1/alerts/{id}",
    params(
        ("id" = Uuid, Path, description = "Alert ID")
    ),
    responses(
        (status = 204, description = "Alert deleted"),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .alerts
        .delete_alert(alert_id)
        .await
        .map_err(map_service_error)?;

    info!("Alert deleted: {}", alert_id);

    Ok(no_content_response())
}

/// Run an alert generation scan on demand
#[utoipa::path(
    post,
    path = "/api/v1/alerts/generate",
    responses(
        (status = 200, description = "Scan completed; newly created alerts returned", body = serde_json::Value),
        (status = 503, description = "Database unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn generate_alerts(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let alerts = state
        .services
        .alert_generator
        .run_scan()
        .await
        .map_err(map_service_error)?;

    info!("On-demand alert scan created {} alert(s)", alerts.len());

    Ok(success_response(serde_json::json!({
        "created": alerts.len(),
        "alerts": alerts
    })))
}

/// Creates the router for alert endpoints
pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/generate", post(generate_alerts))
        .route("/:id", get(get_alert))
        .route("/:id", delete(delete_alert))
        .route("/:id/acknowledge", post(acknowledge_alert))
        .route("/:id/ignore", post(ignore_alert))
}
