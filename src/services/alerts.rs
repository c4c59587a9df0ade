use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::stock_alert::{
    self, AlertPriority, AlertStatus, AlertType, Column as AlertColumn, Entity as StockAlert,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Operator-driven (or issuer-driven) change to an alert's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertTransition {
    Acknowledge,
    Ignore { reason: Option<String> },
    Resolve { purchase_order_id: Uuid },
}

impl AlertTransition {
    fn verb(&self) -> &'static str {
        match self {
            AlertTransition::Acknowledge => "acknowledged",
            AlertTransition::Ignore { .. } => "ignored",
            AlertTransition::Resolve { .. } => "resolved",
        }
    }
}

/// The lifecycle state machine, as a pure function.
///
/// Acknowledge is idempotent from Acknowledged; both terminal states reject
/// every transition with Conflict.
pub fn next_status(
    current: AlertStatus,
    transition: &AlertTransition,
) -> Result<AlertStatus, ServiceError> {
    match (current, transition) {
        (AlertStatus::Active | AlertStatus::Acknowledged, AlertTransition::Acknowledge) => {
            Ok(AlertStatus::Acknowledged)
        }
        (AlertStatus::Active | AlertStatus::Acknowledged, AlertTransition::Ignore { .. }) => {
            Ok(AlertStatus::Ignored)
        }
        (AlertStatus::Active | AlertStatus::Acknowledged, AlertTransition::Resolve { .. }) => {
            Ok(AlertStatus::Resolved)
        }
        (current, transition) => Err(ServiceError::Conflict(format!(
            "Alert in state {} cannot be {}",
            current,
            transition.verb()
        ))),
    }
}

/// Loads an alert and applies one transition on the given connection.
///
/// Generic over `ConnectionTrait` so the purchase order issuer can run the
/// Resolve leg inside its own transaction; errors there abort the whole
/// transaction, the PO insert included.
pub async fn apply_transition<C>(
    conn: &C,
    alert_id: Uuid,
    transition: AlertTransition,
) -> Result<stock_alert::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let alert = StockAlert::find_by_id(alert_id)
        .one(conn)
        .await
        .map_err(|e| {
            error!(alert_id = %alert_id, error = %e, "Database error when loading alert");
            ServiceError::db_error(e)
        })?
        .ok_or_else(|| ServiceError::NotFound(format!("Alert with ID {} not found", alert_id)))?;

    let target = next_status(alert.status, &transition)?;

    // Repeated acknowledge: return the row untouched.
    if alert.status == target {
        return Ok(alert);
    }

    let mut active: stock_alert::ActiveModel = alert.into();
    active.status = Set(target);
    match transition {
        AlertTransition::Acknowledge => {}
        AlertTransition::Ignore { reason } => {
            active.ignore_reason = Set(reason);
        }
        AlertTransition::Resolve { purchase_order_id } => {
            active.resolving_purchase_order_id = Set(Some(purchase_order_id));
        }
    }
    active.updated_at = Set(Utc::now());

    active.update(conn).await.map_err(|e| {
        error!(alert_id = %alert_id, error = %e, "Database error when updating alert");
        ServiceError::db_error(e)
    })
}

/// Filters and pagination for the alert list endpoint.
#[derive(Debug, Clone, Default)]
pub struct AlertListFilter {
    pub status: Option<AlertStatus>,
    pub alert_type: Option<AlertType>,
    pub priority: Option<AlertPriority>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of alerts plus the pagination that was actually applied after
/// clamping.
#[derive(Debug)]
pub struct AlertPage {
    pub alerts: Vec<stock_alert::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Service for reading alerts and driving their lifecycle
#[derive(Clone)]
pub struct AlertService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_page_size: u64,
    max_page_size: u64,
}

impl AlertService {
    /// Creates a new alert service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        default_page_size: u64,
        max_page_size: u64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            default_page_size,
            max_page_size,
        }
    }

    /// Gets an alert by ID
    #[instrument(skip(self))]
    pub async fn get_alert(&self, id: Uuid) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db_pool;

        StockAlert::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(alert_id = %id, error = %e, "Database error when fetching alert");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert with ID {} not found", id)))
    }

    /// Lists alerts with optional filters and pagination.
    ///
    /// Ordering is total: priority rank, then creation time, then id, all
    /// descending, so repeated reads page through a stable sequence.
    #[instrument(skip(self))]
    pub async fn list_alerts(&self, filter: AlertListFilter) -> Result<AlertPage, ServiceError> {
        let db = &*self.db_pool;

        let page = filter.page.unwrap_or(1).max(1);
        let limit = filter
            .limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let mut query = StockAlert::find();

        if let Some(status) = filter.status {
            query = query.filter(AlertColumn::Status.eq(status));
        }
        if let Some(alert_type) = filter.alert_type {
            query = query.filter(AlertColumn::AlertType.eq(alert_type));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(AlertColumn::Priority.eq(priority));
        }

        query = query
            .order_by_desc(AlertColumn::Priority)
            .order_by_desc(AlertColumn::CreatedAt)
            .order_by_desc(AlertColumn::Id);

        let paginator = query.paginate(db, limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Database error when counting alerts");
            ServiceError::db_error(e)
        })?;

        let alerts = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(page = %page, limit = %limit, error = %e, "Database error when fetching alerts");
            ServiceError::db_error(e)
        })?;

        Ok(AlertPage {
            alerts,
            total,
            page,
            limit,
        })
    }

    /// Acknowledges an alert. Idempotent for already-acknowledged alerts.
    #[instrument(skip(self))]
    pub async fn acknowledge_alert(&self, id: Uuid) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db_pool;
        let alert = apply_transition(db, id, AlertTransition::Acknowledge).await?;

        self.event_sender
            .send_or_log(Event::AlertAcknowledged(alert.id))
            .await;

        info!(alert_id = %alert.id, "Alert acknowledged");

        Ok(alert)
    }

    /// Ignores an alert, recording the operator's reason when given.
    #[instrument(skip(self))]
    pub async fn ignore_alert(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db_pool;
        let alert = apply_transition(
            db,
            id,
            AlertTransition::Ignore {
                reason: reason.clone(),
            },
        )
        .await?;

        self.event_sender
            .send_or_log(Event::AlertIgnored {
                alert_id: alert.id,
                reason,
            })
            .await;

        info!(alert_id = %alert.id, "Alert ignored");

        Ok(alert)
    }

    /// Administrative hard delete.
    #[instrument(skip(self))]
    pub async fn delete_alert(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let alert = StockAlert::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(alert_id = %id, error = %e, "Database error when finding alert");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert with ID {} not found", id)))?;

        StockAlert::delete_by_id(alert.id).exec(db).await.map_err(|e| {
            error!(alert_id = %id, error = %e, "Database error when deleting alert");
            ServiceError::db_error(e)
        })?;

        self.event_sender.send_or_log(Event::AlertDeleted(id)).await;

        info!(alert_id = %id, "Alert deleted");

        Ok(())
    }
}
