use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.3.0",
        description = r#"
# Stockroom Alert & Replenishment API

An API for keeping warehouse stock healthy: it scans the catalog for low
and exhausted stock, raises prioritized alerts, issues purchase orders to
suppliers and forecasts consumption from recent outbound movements.

## Features

- **Stock Alerts**: Automatic low-stock, out-of-stock and overdue-order alerts
- **Alert Lifecycle**: Acknowledge, ignore or resolve alerts with full auditability
- **Purchase Orders**: One-call ordering that resolves the triggering alert atomically
- **Forecasting**: Days-until-stockout projections and reorder recommendations

## Error Handling

The API uses consistent error response formats with appropriate HTTP status codes:

```json
{
  "error": "not_found",
  "message": "Alert with ID 00000000-0000-0000-0000-000000000000 not found",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 20, max: 100)
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "alerts", description = "Stock alert management endpoints"),
        (name = "purchase-orders", description = "Purchase order endpoints"),
        (name = "forecast", description = "Consumption forecasting endpoints")
    ),
    paths(
        // Alerts
        crate::handlers::alerts::list_alerts,
        crate::handlers::alerts::get_alert,
        crate::handlers::alerts::acknowledge_alert,
        crate::handlers::alerts::ignore_alert,
        crate::handlers::alerts::delete_alert,
        crate::handlers::alerts::generate_alerts,

        // Purchase orders
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::send_purchase_order,

        // Forecasting
        crate::handlers::forecast::get_forecast,
        crate::handlers::forecast::get_replenishment_suggestion,

        // Status & health intentionally omitted from OpenAPI paths
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Alert types
            crate::handlers::alerts::IgnoreAlertRequest,

            // Purchase order types
            crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
            crate::handlers::purchase_orders::SendPurchaseOrderRequest,

            // Forecast types
            crate::services::replenishment::ReplenishmentSuggestion,
            crate::services::replenishment::Urgency,
            crate::services::forecast::ConsumptionReport,
            crate::services::forecast::ForecastItem,
            crate::services::forecast::ForecastSummary,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
