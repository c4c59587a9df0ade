use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use metrics::counter;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db::{is_unique_violation, DbPool};
use crate::entities::product::Entity as Product;
use crate::entities::purchase_order::{
    self, Column as PoColumn, Entity as PurchaseOrder, PurchaseOrderStatus,
};
use crate::entities::stock_alert::{self, AlertType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::alerts::{apply_transition, AlertTransition};

/// Attempts at a unique PO number before giving up. Collisions need two
/// issuances on the same day drawing the same six-character suffix.
const MAX_PO_NUMBER_ATTEMPTS: u32 = 5;

/// Input for issuing a purchase order.
#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub product_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    /// Alert to resolve in the same transaction as the insert.
    pub alert_id: Option<Uuid>,
    /// Defaults to today plus the configured lead time.
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Outcome of a successful issuance.
#[derive(Debug)]
pub struct IssuedPurchaseOrder {
    pub purchase_order: purchase_order::Model,
    pub resolved_alert: Option<stock_alert::Model>,
}

/// One page of purchase orders plus the pagination actually applied.
#[derive(Debug)]
pub struct PurchaseOrderPage {
    pub purchase_orders: Vec<purchase_order::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Service that turns alerts into purchase orders and records their
/// dispatch to suppliers
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    po_number_prefix: String,
    po_default_lead_days: i64,
    default_page_size: u64,
    max_page_size: u64,
}

impl PurchaseOrderService {
    /// Creates a new purchase order service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        po_number_prefix: String,
        po_default_lead_days: i64,
        default_page_size: u64,
        max_page_size: u64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            po_number_prefix,
            po_default_lead_days,
            default_page_size,
            max_page_size,
        }
    }

    /// Issues a purchase order, optionally resolving the alert that
    /// prompted it.
    ///
    /// The unit price is snapshotted from the product at issuance. Insert
    /// and alert resolution run in one transaction: a terminal or missing
    /// alert aborts the insert too. Events go out only after commit.
    #[instrument(skip(self))]
    pub async fn issue(
        &self,
        input: NewPurchaseOrder,
    ) -> Result<IssuedPurchaseOrder, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Order quantity must be greater than zero".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let product = Product::find_by_id(input.product_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(product_id = %input.product_id, error = %e, "Database error when loading product");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", input.product_id))
            })?;

        let supplier_id = product.supplier_id.ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Product {} has no supplier associated",
                product.name
            ))
        })?;

        let today = Utc::now().date_naive();
        let expected_delivery_date = input
            .expected_delivery_date
            .unwrap_or(today + Duration::days(self.po_default_lead_days));
        let total_amount = product.unit_price * Decimal::from(input.quantity);

        for attempt in 1..=MAX_PO_NUMBER_ATTEMPTS {
            let po_number = generate_po_number(&self.po_number_prefix, today);
            let candidate = purchase_order::ActiveModel {
                id: Set(Uuid::new_v4()),
                po_number: Set(po_number),
                product_id: Set(product.id),
                supplier_id: Set(supplier_id),
                quantity_ordered: Set(input.quantity),
                unit_price_at_issuance: Set(product.unit_price),
                total_amount: Set(total_amount),
                status: Set(PurchaseOrderStatus::Created),
                sent_method: Set(None),
                sent_to: Set(None),
                sent_at: Set(None),
                expected_delivery_date: Set(expected_delivery_date),
                notes: Set(input.notes.clone()),
                created_at: Set(Utc::now()),
            };

            let alert_id = input.alert_id;
            let result = db
                .transaction::<_, (purchase_order::Model, Option<stock_alert::Model>), ServiceError>(
                    move |txn| {
                        Box::pin(async move {
                            let po = candidate.insert(txn).await.map_err(ServiceError::db_error)?;

                            let resolved = match alert_id {
                                Some(alert_id) => {
                                    let resolved = apply_transition(
                                        txn,
                                        alert_id,
                                        AlertTransition::Resolve {
                                            purchase_order_id: po.id,
                                        },
                                    )
                                    .await?;

                                    // A stock alert must be resolved by an order
                                    // for its own product.
                                    if matches!(
                                        resolved.alert_type,
                                        AlertType::LowStock | AlertType::OutOfStock
                                    ) && resolved.related_id != po.product_id
                                    {
                                        return Err(ServiceError::ValidationError(format!(
                                            "Alert {} does not belong to product {}",
                                            alert_id, po.product_id
                                        )));
                                    }

                                    Some(resolved)
                                }
                                None => None,
                            };

                            Ok((po, resolved))
                        })
                    },
                )
                .await
                .map_err(|e| match e {
                    TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                    TransactionError::Transaction(service_err) => service_err,
                });

            match result {
                Ok((po, resolved_alert)) => {
                    counter!("stockroom_purchase_orders.issued", 1);
                    self.event_sender
                        .send_or_log(Event::PurchaseOrderIssued {
                            purchase_order_id: po.id,
                            po_number: po.po_number.clone(),
                            product_id: po.product_id,
                        })
                        .await;
                    if let Some(alert) = &resolved_alert {
                        self.event_sender
                            .send_or_log(Event::AlertResolved {
                                alert_id: alert.id,
                                purchase_order_id: po.id,
                            })
                            .await;
                    }

                    info!(
                        po_id = %po.id,
                        po_number = %po.po_number,
                        product_id = %po.product_id,
                        "Purchase order issued"
                    );

                    return Ok(IssuedPurchaseOrder {
                        purchase_order: po,
                        resolved_alert,
                    });
                }
                // The alert resolution only touches non-unique columns, so a
                // unique violation inside the transaction is always po_number.
                Err(ServiceError::DatabaseError(e)) if is_unique_violation(&e) => {
                    warn!(attempt, "Purchase order number collision, regenerating");
                    counter!("stockroom_purchase_orders.number_collisions", 1);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ServiceError::InternalError(
            "Could not allocate a unique purchase order number".to_string(),
        ))
    }

    /// Records that the order went out to the supplier.
    ///
    /// Audit fields are last-wins: re-sending overwrites method, recipient
    /// and timestamp. The actual delivery is simulated downstream of the
    /// event channel and can never roll this update back.
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        po_id: Uuid,
        method: String,
        recipient: String,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db_pool;

        let po = PurchaseOrder::find_by_id(po_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(po_id = %po_id, error = %e, "Database error when loading purchase order");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order with ID {} not found", po_id))
            })?;

        let mut active: purchase_order::ActiveModel = po.into();
        active.status = Set(PurchaseOrderStatus::Sent);
        active.sent_method = Set(Some(method.clone()));
        active.sent_to = Set(Some(recipient.clone()));
        active.sent_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(po_id = %po_id, error = %e, "Database error when updating purchase order");
            ServiceError::db_error(e)
        })?;

        counter!("stockroom_purchase_orders.sent", 1);
        self.event_sender
            .send_or_log(Event::PurchaseOrderSent {
                purchase_order_id: updated.id,
                po_number: updated.po_number.clone(),
                method,
                recipient,
            })
            .await;

        info!(po_id = %updated.id, po_number = %updated.po_number, "Purchase order sent");

        Ok(updated)
    }

    /// Gets a purchase order by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db_pool;

        PurchaseOrder::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(po_id = %id, error = %e, "Database error when fetching purchase order");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order with ID {} not found", id))
            })
    }

    /// Lists purchase orders, newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        status: Option<PurchaseOrderStatus>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PurchaseOrderPage, ServiceError> {
        let db = &*self.db_pool;

        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let mut query = PurchaseOrder::find();

        if let Some(status) = status {
            query = query.filter(PoColumn::Status.eq(status));
        }

        query = query
            .order_by_desc(PoColumn::CreatedAt)
            .order_by_desc(PoColumn::Id);

        let paginator = query.paginate(db, limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Database error when counting purchase orders");
            ServiceError::db_error(e)
        })?;

        let purchase_orders = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(page = %page, limit = %limit, error = %e, "Database error when fetching purchase orders");
            ServiceError::db_error(e)
        })?;

        Ok(PurchaseOrderPage {
            purchase_orders,
            total,
            page,
            limit,
        })
    }
}

/// `{prefix}-YYYYMMDD-XXXXXX` with an uppercase alphanumeric suffix.
fn generate_po_number(prefix: &str, date: NaiveDate) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();

    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), suffix)
}
