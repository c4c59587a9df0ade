use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::catalog::CatalogService;
use crate::services::replenishment::{
    average_daily_consumption, days_until_stockout, urgency_for, Urgency,
};

/// One row of the consumption report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub current_stock: i32,
    pub avg_consumption_per_day: f64,
    /// None when projection is impossible; such rows still report Normal
    /// urgency rather than being dropped.
    pub days_until_stockout: Option<i64>,
    pub urgency: Urgency,
    pub reorder_recommended: bool,
}

/// Urgency counts over every tracked product, not just the returned page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastSummary {
    pub high: usize,
    pub medium: usize,
    pub normal: usize,
    pub tracked: usize,
}

/// The dashboard payload: fastest-moving products first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumptionReport {
    pub items: Vec<ForecastItem>,
    pub summary: ForecastSummary,
    pub window_days: i64,
}

/// Read-only reporting over the same math the planner uses
#[derive(Clone)]
pub struct ForecastService {
    catalog: CatalogService,
    consumption_window_days: i64,
    forecast_top_n: usize,
    stockout_reorder_horizon_days: i64,
}

impl ForecastService {
    /// Creates a new forecast service instance
    pub fn new(
        catalog: CatalogService,
        consumption_window_days: i64,
        forecast_top_n: usize,
        stockout_reorder_horizon_days: i64,
    ) -> Self {
        Self {
            catalog,
            consumption_window_days,
            forecast_top_n,
            stockout_reorder_horizon_days,
        }
    }

    /// Builds the consumption report.
    ///
    /// Tracked products are those with stock on hand and at least one
    /// outbound movement inside the window. The summary counts all of
    /// them; the item list is capped to the configured top N after
    /// sorting by consumption rate.
    #[instrument(skip(self))]
    pub async fn consumption_report(&self) -> Result<ConsumptionReport, ServiceError> {
        let window_start = Utc::now() - Duration::days(self.consumption_window_days);

        let products = self.catalog.product_snapshot().await?;
        let totals = self.catalog.outbound_totals_since(window_start).await?;

        let mut items: Vec<ForecastItem> = products
            .into_iter()
            .filter(|p| p.current_stock > 0)
            .filter_map(|product| {
                let total_out = *totals.get(&product.id)?;
                let avg = average_daily_consumption(total_out, self.consumption_window_days);
                let days = days_until_stockout(product.current_stock, avg);

                Some(ForecastItem {
                    product_id: product.id,
                    product_name: product.name,
                    current_stock: product.current_stock,
                    avg_consumption_per_day: avg,
                    days_until_stockout: days,
                    urgency: urgency_for(days),
                    reorder_recommended: days
                        .map_or(false, |d| d <= self.stockout_reorder_horizon_days),
                })
            })
            .collect();

        items.sort_by(|a, b| {
            b.avg_consumption_per_day
                .total_cmp(&a.avg_consumption_per_day)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        let mut summary = ForecastSummary {
            high: 0,
            medium: 0,
            normal: 0,
            tracked: items.len(),
        };
        for item in &items {
            match item.urgency {
                Urgency::High => summary.high += 1,
                Urgency::Medium => summary.medium += 1,
                Urgency::Normal => summary.normal += 1,
            }
        }

        items.truncate(self.forecast_top_n);

        info!(
            tracked = summary.tracked,
            returned = items.len(),
            "Consumption report built"
        );

        Ok(ConsumptionReport {
            items,
            summary,
            window_days: self.consumption_window_days,
        })
    }
}
