//! Shared harness for integration tests.
//!
//! Helpers are compiled into every test binary; not all binaries use all of
//! them.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend as DbBackend, Set, Statement,
};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db,
    entities::{
        product,
        stock_movement::{self, MovementDirection},
    },
    events::{self, EventSender},
    handlers::AppServices,
    notifications::LoggingNotificationSink,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by a
/// file-based SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // Unique file per harness so test binaries can run in parallel.
        let db_file = format!("stockroom_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        // Ensure a clean schema for each test run.
        let reset_statements = [
            "DROP TABLE IF EXISTS stock_alerts;",
            "DROP TABLE IF EXISTS stock_movements;",
            "DROP TABLE IF EXISTS purchase_orders;",
            "DROP TABLE IF EXISTS products;",
        ];
        for sql in reset_statements {
            let _ = pool
                .execute(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
                .await;
        }

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(
            event_rx,
            Arc::new(LoggingNotificationSink),
        ));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", stockroom_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            db_file,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Insert a catalog product with a supplier attached.
    pub async fn seed_product(
        &self,
        name: &str,
        current_stock: i32,
        low_stock_threshold: i32,
    ) -> product::Model {
        self.insert_product(name, current_stock, low_stock_threshold, Some(Uuid::new_v4()))
            .await
    }

    /// Insert a catalog product with no supplier on file.
    pub async fn seed_product_without_supplier(
        &self,
        name: &str,
        current_stock: i32,
        low_stock_threshold: i32,
    ) -> product::Model {
        self.insert_product(name, current_stock, low_stock_threshold, None)
            .await
    }

    async fn insert_product(
        &self,
        name: &str,
        current_stock: i32,
        low_stock_threshold: i32,
        supplier_id: Option<Uuid>,
    ) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            category: Set(Some("test".to_string())),
            current_stock: Set(current_stock),
            low_stock_threshold: Set(low_stock_threshold),
            max_stock_level: Set(500),
            reorder_point: Set(low_stock_threshold.max(1) * 2),
            unit: Set("pcs".to_string()),
            unit_price: Set(Decimal::new(250, 2)),
            supplier_id: Set(supplier_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product for tests")
    }

    /// Insert a stock movement that occurred `days_ago` days in the past.
    pub async fn seed_movement(
        &self,
        product_id: Uuid,
        direction: MovementDirection,
        quantity: i32,
        days_ago: i64,
    ) -> stock_movement::Model {
        stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            direction: Set(direction),
            quantity: Set(quantity),
            occurred_at: Set(Utc::now() - Duration::days(days_ago)),
            reference_type: Set(Some("order".to_string())),
            reference_id: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed stock movement for tests")
    }

    /// Convenience wrapper for outbound (consumption) movements.
    pub async fn seed_outbound_movement(
        &self,
        product_id: Uuid,
        quantity: i32,
        days_ago: i64,
    ) -> stock_movement::Model {
        self.seed_movement(product_id, MovementDirection::Out, quantity, days_ago)
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_file, suffix));
        }
    }
}

/// Parse a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
