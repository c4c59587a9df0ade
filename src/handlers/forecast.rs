use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use uuid::Uuid;

/// Consumption forecast across the catalog
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    responses(
        (status = 200, description = "Forecast report", body = crate::services::forecast::ConsumptionReport),
        (status = 503, description = "Database unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "forecast"
)]
pub async fn get_forecast(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let report = state
        .services
        .forecast
        .consumption_report()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Replenishment suggestion for a single product
#[utoipa::path(
    get,
    path = "/api/v1/replenishment/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Replenishment suggestion", body = crate::services::replenishment::ReplenishmentSuggestion),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "forecast"
)]
pub async fn get_replenishment_suggestion(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let suggestion = state
        .services
        .replenishment
        .suggestion_for_product(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(suggestion))
}

/// Creates the router for the forecast report
pub fn forecast_routes() -> Router<AppState> {
    Router::new().route("/", get(get_forecast))
}

/// Creates the router for per-product replenishment suggestions
pub fn replenishment_routes() -> Router<AppState> {
    Router::new().route("/:product_id", get(get_replenishment_suggestion))
}
