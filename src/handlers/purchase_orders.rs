use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::purchase_order::PurchaseOrderStatus,
    errors::ApiError,
    handlers::common::{parse_enum_param, PaginatedResponse},
    handlers::AppState,
    services::purchase_orders::NewPurchaseOrder,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Active or acknowledged alert to resolve together with the order
    pub alert_id: Option<Uuid>,
    /// Defaults to today plus the configured lead time when omitted
    pub expected_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendPurchaseOrderRequest {
    /// Delivery channel, e.g. email or fax
    #[validate(length(min = 1, max = 50))]
    pub method: String,
    #[validate(length(min = 1, max = 255))]
    pub recipient: String,
}

#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ListPurchaseOrdersParams {
    /// Status filter: created or sent
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

// Handler functions

/// Create a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = serde_json::Value),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or alert not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Referenced alert is in a terminal state", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let CreatePurchaseOrderRequest {
        product_id,
        quantity,
        notes,
        alert_id,
        expected_delivery_date,
    } = payload;

    let issued = state
        .services
        .purchase_orders
        .issue(NewPurchaseOrder {
            product_id,
            quantity,
            notes,
            alert_id,
            expected_delivery_date,
        })
        .await
        .map_err(map_service_error)?;

    info!(
        "Purchase order created: {} ({})",
        issued.purchase_order.id, issued.purchase_order.po_number
    );

    Ok(created_response(serde_json::json!({
        "po_id": issued.purchase_order.id,
        "po_number": issued.purchase_order.po_number,
        "total_amount": issued.purchase_order.total_amount,
        "purchase_order": issued.purchase_order,
        "resolved_alert_id": issued.resolved_alert.map(|a| a.id)
    })))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order fetched", body = serde_json::Value),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let purchase_order = state
        .services
        .purchase_orders
        .get_purchase_order(po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(purchase_order))
}

/// List purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(ListPurchaseOrdersParams),
    responses(
        (status = 200, description = "Purchase orders listed", body = serde_json::Value),
        (status = 400, description = "Invalid filter value", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(params): Query<ListPurchaseOrdersParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = parse_enum_param::<PurchaseOrderStatus>(params.status.as_deref(), "status")?;

    let page = state
        .services
        .purchase_orders
        .list_purchase_orders(status, params.page, params.limit)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        page.purchase_orders,
        page.page,
        page.limit,
        page.total,
    )))
}

/// Record that a purchase order was sent to its supplier
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/send",
    request_body = SendPurchaseOrderRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order marked as sent", body = serde_json::Value),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn send_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<SendPurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let SendPurchaseOrderRequest { method, recipient } = payload;

    let purchase_order = state
        .services
        .purchase_orders
        .send(po_id, method, recipient)
        .await
        .map_err(map_service_error)?;

    info!(
        "Purchase order sent: {} ({})",
        purchase_order.id, purchase_order.po_number
    );

    Ok(success_response(purchase_order))
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order))
        .route("/", get(list_purchase_orders))
        .route("/:id", get(get_purchase_order))
        .route("/:id/send", post(send_purchase_order))
}
