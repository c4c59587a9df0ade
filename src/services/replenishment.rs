use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::catalog::CatalogService;

/// How soon a product is projected to run dry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Normal,
}

/// Average daily consumption over the trailing window. Zero when there is
/// no outbound history (or a degenerate window).
pub fn average_daily_consumption(total_out: i64, window_days: i64) -> f64 {
    if window_days <= 0 {
        return 0.0;
    }
    total_out.max(0) as f64 / window_days as f64
}

/// Recommended order quantity.
///
/// Without consumption history the recommendation falls back to restocking
/// twice the low-stock threshold; with history it covers `coverage_days` of
/// demand, rounded up to whole units, and never drops below the product's
/// reorder point. Always at least one unit.
pub fn suggested_order_quantity(
    avg_daily: f64,
    low_stock_threshold: i32,
    reorder_point: i32,
    coverage_days: i64,
) -> i64 {
    let suggested = if avg_daily <= 0.0 {
        2 * i64::from(low_stock_threshold)
    } else {
        let coverage = (avg_daily * coverage_days as f64).ceil() as i64;
        coverage.max(i64::from(reorder_point))
    };
    suggested.max(1)
}

/// Days until the shelf empties at the current rate. `None` when there is
/// no outbound history to project from; never a division by zero.
pub fn days_until_stockout(current_stock: i32, avg_daily: f64) -> Option<i64> {
    if avg_daily <= 0.0 {
        return None;
    }
    Some((f64::from(current_stock.max(0)) / avg_daily).floor() as i64)
}

/// Urgency tier for a projected stockout. No projection means no urgency.
pub fn urgency_for(days_until_stockout: Option<i64>) -> Urgency {
    match days_until_stockout {
        Some(days) if days <= 7 => Urgency::High,
        Some(days) if days <= 14 => Urgency::Medium,
        _ => Urgency::Normal,
    }
}

/// Advisory restock plan for one product. Produced on demand; never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReplenishmentSuggestion {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub current_stock: i32,
    pub low_stock_threshold: i32,
    pub reorder_point: i32,
    pub avg_consumption_per_day: f64,
    pub suggested_order_quantity: i64,
    /// None when the product has no outbound history in the window.
    pub days_until_stockout: Option<i64>,
    pub urgency: Urgency,
    pub window_days: i64,
    pub coverage_days: i64,
}

/// Service computing restock suggestions from the catalog snapshot
#[derive(Clone)]
pub struct ReplenishmentService {
    catalog: CatalogService,
    consumption_window_days: i64,
    coverage_days: i64,
}

impl ReplenishmentService {
    /// Creates a new replenishment service instance
    pub fn new(catalog: CatalogService, consumption_window_days: i64, coverage_days: i64) -> Self {
        Self {
            catalog,
            consumption_window_days,
            coverage_days,
        }
    }

    /// Builds the advisory suggestion for one product.
    #[instrument(skip(self))]
    pub async fn suggestion_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<ReplenishmentSuggestion, ServiceError> {
        let product = self
            .catalog
            .product_by_id(product_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        let window_start = Utc::now() - Duration::days(self.consumption_window_days);
        let total_out = self
            .catalog
            .outbound_total_for_product(product_id, window_start)
            .await?;

        let avg = average_daily_consumption(total_out, self.consumption_window_days);
        let days = days_until_stockout(product.current_stock, avg);

        Ok(ReplenishmentSuggestion {
            product_id: product.id,
            product_name: product.name,
            unit: product.unit,
            current_stock: product.current_stock,
            low_stock_threshold: product.low_stock_threshold,
            reorder_point: product.reorder_point,
            avg_consumption_per_day: avg,
            suggested_order_quantity: suggested_order_quantity(
                avg,
                product.low_stock_threshold,
                product.reorder_point,
                self.coverage_days,
            ),
            days_until_stockout: days,
            urgency: urgency_for(days),
            window_days: self.consumption_window_days,
            coverage_days: self.coverage_days,
        })
    }
}
