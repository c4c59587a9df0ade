pub mod alerts;
pub mod common;
pub mod forecast;
pub mod purchase_orders;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::alert_generator::AlertGeneratorService;
use crate::services::alerts::AlertService;
use crate::services::catalog::CatalogService;
use crate::services::forecast::ForecastService;
use crate::services::purchase_orders::PurchaseOrderService;
use crate::services::replenishment::ReplenishmentService;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub alerts: Arc<AlertService>,
    pub alert_generator: Arc<AlertGeneratorService>,
    pub replenishment: Arc<ReplenishmentService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub forecast: Arc<ForecastService>,
}

impl AppServices {
    /// Wires every service onto the shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let catalog = CatalogService::new(db_pool.clone());

        let alerts = Arc::new(AlertService::new(
            db_pool.clone(),
            event_sender.clone(),
            u64::from(config.api_default_page_size),
            u64::from(config.api_max_page_size),
        ));

        let alert_generator = Arc::new(AlertGeneratorService::new(
            db_pool.clone(),
            catalog.clone(),
            event_sender.clone(),
        ));

        let replenishment = Arc::new(ReplenishmentService::new(
            catalog.clone(),
            config.consumption_window_days,
            config.coverage_days,
        ));

        let purchase_orders = Arc::new(PurchaseOrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.po_number_prefix.clone(),
            config.po_default_lead_days,
            u64::from(config.api_default_page_size),
            u64::from(config.api_max_page_size),
        ));

        let forecast = Arc::new(ForecastService::new(
            catalog.clone(),
            config.consumption_window_days,
            config.forecast_top_n,
            config.stockout_reorder_horizon_days,
        ));

        Self {
            catalog,
            alerts,
            alert_generator,
            replenishment,
            purchase_orders,
            forecast,
        }
    }
}
