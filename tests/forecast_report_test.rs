mod common;

use axum::http::{Method, StatusCode};
use serde_json::Value;
use stockroom_api::entities::stock_movement::MovementDirection;
use uuid::Uuid;

use common::{response_json, TestApp};

fn item_for<'a>(items: &'a [Value], product_id: &str) -> &'a Value {
    items
        .iter()
        .find(|i| i["product_id"] == product_id)
        .unwrap_or_else(|| panic!("no forecast item for product {product_id}"))
}

#[tokio::test]
async fn forecast_ranks_products_by_consumption() {
    let app = TestApp::new().await;

    // 60 units out over the 30-day window: 2.0/day against 10 on hand.
    let fast = app.seed_product("Fast Mover", 10, 4).await;
    app.seed_outbound_movement(fast.id, 20, 2).await;
    app.seed_outbound_movement(fast.id, 20, 10).await;
    app.seed_outbound_movement(fast.id, 20, 20).await;
    // Outside the window; must not count.
    app.seed_outbound_movement(fast.id, 500, 40).await;
    // Inbound receipts never count as consumption.
    app.seed_movement(fast.id, MovementDirection::In, 300, 3).await;

    // 30 units out: 1.0/day against 40 on hand.
    let slow = app.seed_product("Slow Mover", 40, 4).await;
    app.seed_outbound_movement(slow.id, 30, 5).await;

    // No outbound history: excluded from the report.
    app.seed_product("Dormant", 50, 4).await;

    // Depleted products are alert territory, not forecast territory.
    let gone = app.seed_product("Gone", 0, 4).await;
    app.seed_outbound_movement(gone.id, 10, 1).await;

    let response = app.request(Method::GET, "/api/v1/forecast", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    let items = body["data"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product_id"], fast.id.to_string());
    assert_eq!(items[1]["product_id"], slow.id.to_string());

    let fast_item = item_for(items, &fast.id.to_string());
    assert_eq!(fast_item["avg_consumption_per_day"], 2.0);
    assert_eq!(fast_item["days_until_stockout"], 5);
    assert_eq!(fast_item["urgency"], "high");
    assert_eq!(fast_item["reorder_recommended"], true);

    let slow_item = item_for(items, &slow.id.to_string());
    assert_eq!(slow_item["avg_consumption_per_day"], 1.0);
    assert_eq!(slow_item["days_until_stockout"], 40);
    assert_eq!(slow_item["urgency"], "normal");
    assert_eq!(slow_item["reorder_recommended"], false);

    assert_eq!(body["data"]["summary"]["high"], 1);
    assert_eq!(body["data"]["summary"]["medium"], 0);
    assert_eq!(body["data"]["summary"]["normal"], 1);
    assert_eq!(body["data"]["summary"]["tracked"], 2);
}

#[tokio::test]
async fn summary_counts_all_tracked_products_beyond_the_display_cap() {
    let app = TestApp::new().await;
    let top_n = app.state.config.forecast_top_n;
    let seeded = top_n + 5;

    for i in 0..seeded {
        let product = app
            .seed_product(&format!("Product {i:02}"), 100, 4)
            .await;
        // Varying consumption so the ranking is total-ordered.
        app.seed_outbound_movement(product.id, (i as i32 + 1) * 3, 6)
            .await;
    }

    let response = app.request(Method::GET, "/api/v1/forecast", None).await;
    let body = response_json(response).await;

    let items = body["data"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), top_n, "report is capped to the top N");
    assert_eq!(body["data"]["summary"]["tracked"], seeded);

    // Descending by average daily consumption.
    let averages: Vec<f64> = items
        .iter()
        .map(|i| i["avg_consumption_per_day"].as_f64().unwrap())
        .collect();
    let mut sorted = averages.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(averages, sorted);
}

#[tokio::test]
async fn replenishment_suggestion_covers_forecast_demand() {
    let app = TestApp::new().await;

    // avg 2.0/day; coverage 14 days => ceil(28) beats reorder point 20.
    let busy = app.seed_product("Busy Widget", 8, 10).await;
    app.seed_outbound_movement(busy.id, 60, 10).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/replenishment/{}", busy.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["data"]["avg_consumption_per_day"], 2.0);
    assert_eq!(body["data"]["suggested_order_quantity"], 28);
    assert_eq!(body["data"]["days_until_stockout"], 4);
    assert_eq!(body["data"]["urgency"], "high");

    // Without history the fallback is twice the low stock threshold.
    let quiet = app.seed_product("Quiet Widget", 8, 10).await;
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/replenishment/{}", quiet.id),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["suggested_order_quantity"], 20);
    assert!(body["data"]["days_until_stockout"].is_null());
    assert_eq!(body["data"]["urgency"], "normal");

    let missing = app
        .request(
            Method::GET,
            &format!("/api/v1/replenishment/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
