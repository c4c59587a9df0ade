mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use stockroom_api::entities::stock_alert;
use uuid::Uuid;

use common::{response_json, TestApp};

/// Runs a scan and returns the id of the single alert it creates.
async fn generate_single_alert(app: &TestApp) -> String {
    let response = app
        .request(Method::POST, "/api/v1/alerts/generate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let alerts = body["data"]["alerts"].as_array().expect("alerts array");
    assert_eq!(alerts.len(), 1, "expected exactly one generated alert");
    alerts[0]["id"].as_str().expect("alert id").to_string()
}

#[tokio::test]
async fn acknowledge_is_idempotent_and_terminal_states_conflict() {
    let app = TestApp::new().await;
    app.seed_product("Low Widget", 3, 10).await;
    let alert_id = generate_single_alert(&app).await;

    let ack = app
        .request(
            Method::POST,
            &format!("/api/v1/alerts/{alert_id}/acknowledge"),
            None,
        )
        .await;
    assert_eq!(ack.status(), StatusCode::OK);
    assert_eq!(response_json(ack).await["data"]["status"], "acknowledged");

    // Acknowledging twice is a no-op, not an error.
    let again = app
        .request(
            Method::POST,
            &format!("/api/v1/alerts/{alert_id}/acknowledge"),
            None,
        )
        .await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(response_json(again).await["data"]["status"], "acknowledged");

    let ignore = app
        .request(
            Method::POST,
            &format!("/api/v1/alerts/{alert_id}/ignore"),
            Some(json!({ "reason": "supplier holiday backlog" })),
        )
        .await;
    assert_eq!(ignore.status(), StatusCode::OK);
    let ignored = response_json(ignore).await;
    assert_eq!(ignored["data"]["status"], "ignored");
    assert_eq!(ignored["data"]["ignore_reason"], "supplier holiday backlog");

    // Ignored is terminal: no further transitions.
    let ack_after_ignore = app
        .request(
            Method::POST,
            &format!("/api/v1/alerts/{alert_id}/acknowledge"),
            None,
        )
        .await;
    assert_eq!(ack_after_ignore.status(), StatusCode::CONFLICT);

    let ignore_after_ignore = app
        .request(
            Method::POST,
            &format!("/api/v1/alerts/{alert_id}/ignore"),
            Some(json!({})),
        )
        .await;
    assert_eq!(ignore_after_ignore.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn listing_filters_and_orders_by_priority() {
    let app = TestApp::new().await;
    // critical, high and medium shortfalls in one scan.
    let empty = app.seed_product("Empty Widget", 0, 10).await;
    app.seed_product("Half Widget", 4, 10).await;
    app.seed_product("Nearly Fine Widget", 7, 10).await;

    let response = app
        .request(Method::POST, "/api/v1/alerts/generate", None)
        .await;
    assert_eq!(response_json(response).await["data"]["created"], 3);

    let list = app.request(Method::GET, "/api/v1/alerts", None).await;
    assert_eq!(list.status(), StatusCode::OK);
    let body = response_json(list).await;

    let items = body["data"]["items"].as_array().expect("items array");
    let priorities: Vec<&str> = items
        .iter()
        .map(|a| a["priority"].as_str().unwrap())
        .collect();
    assert_eq!(priorities, vec!["critical", "high", "medium"]);
    assert_eq!(body["data"]["pagination"]["total"], 3);

    let low_stock_only = app
        .request(Method::GET, "/api/v1/alerts?type=low_stock", None)
        .await;
    let body = response_json(low_stock_only).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let critical_only = app
        .request(Method::GET, "/api/v1/alerts?priority=critical", None)
        .await;
    let body = response_json(critical_only).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["related_id"], empty.id.to_string());

    let active_only = app
        .request(Method::GET, "/api/v1/alerts?status=active", None)
        .await;
    let body = response_json(active_only).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

    let bogus = app
        .request(Method::GET, "/api/v1/alerts?status=archived", None)
        .await;
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pagination_clamps_limit_and_reports_total_pages() {
    let app = TestApp::new().await;
    for i in 0..5 {
        app.seed_product(&format!("Widget {i}"), 2, 10).await;
    }
    let response = app
        .request(Method::POST, "/api/v1/alerts/generate", None)
        .await;
    assert_eq!(response_json(response).await["data"]["created"], 5);

    let page_one = app
        .request(Method::GET, "/api/v1/alerts?page=1&limit=2", None)
        .await;
    let body = response_json(page_one).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pagination"]["total"], 5);
    assert_eq!(body["data"]["pagination"]["total_pages"], 3);

    let last_page = app
        .request(Method::GET, "/api/v1/alerts?page=3&limit=2", None)
        .await;
    let body = response_json(last_page).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    // A zero limit is clamped up to one item per page.
    let clamped = app
        .request(Method::GET, "/api/v1/alerts?limit=0", None)
        .await;
    let body = response_json(clamped).await;
    assert_eq!(body["data"]["pagination"]["limit"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    // An oversized limit is clamped down to the configured maximum.
    let oversized = app
        .request(Method::GET, "/api/v1/alerts?limit=100000", None)
        .await;
    let body = response_json(oversized).await;
    assert_eq!(
        body["data"]["pagination"]["limit"],
        u64::from(app.state.config.api_max_page_size)
    );
}

#[tokio::test]
async fn get_and_delete_alert() {
    let app = TestApp::new().await;
    app.seed_product("Low Widget", 2, 10).await;
    let alert_id = generate_single_alert(&app).await;

    let fetched = app
        .request(Method::GET, &format!("/api/v1/alerts/{alert_id}"), None)
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(response_json(fetched).await["data"]["id"], alert_id);

    let missing = app
        .request(
            Method::GET,
            &format!("/api/v1/alerts/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let deleted = app
        .request(Method::DELETE, &format!("/api/v1/alerts/{alert_id}"), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let stored = stock_alert::Entity::find()
        .count(&*app.state.db)
        .await
        .expect("count alerts");
    assert_eq!(stored, 0);

    let delete_again = app
        .request(Method::DELETE, &format!("/api/v1/alerts/{alert_id}"), None)
        .await;
    assert_eq!(delete_again.status(), StatusCode::NOT_FOUND);
}
