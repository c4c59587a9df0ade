use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, histogram};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::db::{is_unique_violation, DbPool};
use crate::entities::purchase_order::{Column as PoColumn, Entity as PurchaseOrder};
use crate::entities::stock_alert::{
    self, AlertStatus, AlertType, Column as AlertColumn, Entity as StockAlert,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::catalog::CatalogService;

/// Scans the catalog and the purchase order book for conditions that
/// deserve an alert.
///
/// The in-memory skip-set is an optimization only; the partial unique
/// index on active alerts is what actually guarantees dedup when scans
/// race. Each candidate commits on its own, so one bad row never takes
/// down the batch.
#[derive(Clone)]
pub struct AlertGeneratorService {
    db_pool: Arc<DbPool>,
    catalog: CatalogService,
    event_sender: Arc<EventSender>,
}

impl AlertGeneratorService {
    /// Creates a new alert generator instance
    pub fn new(db_pool: Arc<DbPool>, catalog: CatalogService, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            catalog,
            event_sender,
        }
    }

    /// Runs one full scan and returns only the alerts created by it.
    #[instrument(skip(self))]
    pub async fn run_scan(&self) -> Result<Vec<stock_alert::Model>, ServiceError> {
        let started = std::time::Instant::now();
        let db = &*self.db_pool;

        let products = self.catalog.product_snapshot().await?;
        let active_keys = self.active_alert_keys(db).await?;

        let mut candidates: Vec<stock_alert::Model> = Vec::new();

        for product in &products {
            if !product.is_low_stock() {
                continue;
            }
            let candidate = stock_alert::Model::for_shortfall(product);
            if active_keys.contains(&(candidate.related_id, candidate.alert_type)) {
                continue;
            }
            candidates.push(candidate);
        }

        let today = Utc::now().date_naive();
        let overdue_orders = PurchaseOrder::find()
            .filter(PoColumn::ExpectedDeliveryDate.lt(today))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when loading overdue purchase orders");
                ServiceError::db_error(e)
            })?;

        for po in &overdue_orders {
            let candidate = stock_alert::Model::for_overdue_order(po, po.days_overdue(today));
            if active_keys.contains(&(candidate.related_id, candidate.alert_type)) {
                continue;
            }
            candidates.push(candidate);
        }

        let mut created = Vec::new();

        for candidate in candidates {
            let related_id = candidate.related_id;
            let alert_type = candidate.alert_type;

            match insertable(candidate).insert(db).await {
                Ok(alert) => {
                    counter!(
                        "stockroom_alerts.created",
                        1,
                        "alert_type" => alert_type.to_string()
                    );
                    self.event_sender
                        .send_or_log(Event::AlertCreated {
                            alert_id: alert.id,
                            alert_type: alert.alert_type,
                            priority: alert.priority,
                            related_id: alert.related_id,
                        })
                        .await;
                    created.push(alert);
                }
                // A concurrent scan got there first; the partial index did its job.
                Err(e) if is_unique_violation(&e) => {
                    debug!(
                        related_id = %related_id,
                        alert_type = %alert_type,
                        "Active alert already exists, skipping"
                    );
                }
                Err(e) => {
                    warn!(
                        related_id = %related_id,
                        alert_type = %alert_type,
                        error = %e,
                        "Failed to insert alert, continuing scan"
                    );
                    counter!("stockroom_alerts.scan.insert_failures", 1);
                }
            }
        }

        histogram!("stockroom_alerts.scan.duration", started.elapsed());
        info!(
            new_alerts = created.len(),
            scanned_products = products.len(),
            overdue_orders = overdue_orders.len(),
            "Alert scan completed"
        );

        Ok(created)
    }

    /// All `(related_id, alert_type)` pairs currently alerting, one query.
    async fn active_alert_keys(
        &self,
        db: &DatabaseConnection,
    ) -> Result<HashSet<(Uuid, AlertType)>, ServiceError> {
        let pairs = StockAlert::find()
            .select_only()
            .column(AlertColumn::RelatedId)
            .column(AlertColumn::AlertType)
            .filter(AlertColumn::Status.eq(AlertStatus::Active))
            .into_tuple::<(Uuid, AlertType)>()
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when loading active alert keys");
                ServiceError::db_error(e)
            })?;

        Ok(pairs.into_iter().collect())
    }
}

fn insertable(alert: stock_alert::Model) -> stock_alert::ActiveModel {
    stock_alert::ActiveModel {
        id: Set(alert.id),
        alert_type: Set(alert.alert_type),
        priority: Set(alert.priority),
        related_id: Set(alert.related_id),
        title: Set(alert.title),
        message: Set(alert.message),
        status: Set(alert.status),
        ignore_reason: Set(alert.ignore_reason),
        resolving_purchase_order_id: Set(alert.resolving_purchase_order_id),
        created_at: Set(alert.created_at),
        updated_at: Set(alert.updated_at),
    }
}
