use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::instrument;
use uuid::Uuid;

use crate::db::{with_transient_retry, DbPool};
use crate::entities::product::{self, Column as ProductColumn, Entity as Product};
use crate::entities::stock_movement::{
    self, Column as MovementColumn, Entity as StockMovement, MovementDirection,
};
use crate::errors::ServiceError;

/// Read-only access to the shared catalog tables.
///
/// The generator and the reporting services consume products and stock
/// movements through this surface; nothing here mutates either table.
/// Reads go through the transient-retry wrapper so a flapping database
/// surfaces as 503 instead of 500.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Full product snapshot, name-ordered for stable iteration.
    #[instrument(skip(self))]
    pub async fn product_snapshot(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = Arc::clone(&self.db_pool);
        with_transient_retry("product_snapshot", move || {
            let db = Arc::clone(&db);
            async move {
                Product::find()
                    .order_by_asc(ProductColumn::Name)
                    .all(&*db)
                    .await
            }
        })
        .await
    }

    /// Looks up a single product by id.
    #[instrument(skip(self))]
    pub async fn product_by_id(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let db = Arc::clone(&self.db_pool);
        with_transient_retry("product_by_id", move || {
            let db = Arc::clone(&db);
            async move { Product::find_by_id(id).one(&*db).await }
        })
        .await
    }

    /// Total outbound quantity per product since `window_start`, in one
    /// grouped query. A product absent from the map had no outbound
    /// movement inside the window.
    #[instrument(skip(self))]
    pub async fn outbound_totals_since(
        &self,
        window_start: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, i64>, ServiceError> {
        let db = Arc::clone(&self.db_pool);
        let rows = with_transient_retry("outbound_totals", move || {
            let db = Arc::clone(&db);
            async move {
                StockMovement::find()
                    .select_only()
                    .column(MovementColumn::ProductId)
                    .column_as(
                        Expr::col((stock_movement::Entity, MovementColumn::Quantity)).sum(),
                        "total_out",
                    )
                    .filter(MovementColumn::Direction.eq(MovementDirection::Out))
                    .filter(MovementColumn::OccurredAt.gte(window_start))
                    .group_by(MovementColumn::ProductId)
                    .into_tuple::<(Uuid, Option<i64>)>()
                    .all(&*db)
                    .await
            }
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, total)| (product_id, total.unwrap_or(0)))
            .collect())
    }

    /// Total outbound quantity for one product since `window_start`.
    #[instrument(skip(self))]
    pub async fn outbound_total_for_product(
        &self,
        product_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        let db = Arc::clone(&self.db_pool);
        let total = with_transient_retry("outbound_total_for_product", move || {
            let db = Arc::clone(&db);
            async move {
                StockMovement::find()
                    .select_only()
                    .column_as(
                        Expr::col((stock_movement::Entity, MovementColumn::Quantity)).sum(),
                        "total_out",
                    )
                    .filter(MovementColumn::ProductId.eq(product_id))
                    .filter(MovementColumn::Direction.eq(MovementDirection::Out))
                    .filter(MovementColumn::OccurredAt.gte(window_start))
                    .into_tuple::<Option<i64>>()
                    .one(&*db)
                    .await
            }
        })
        .await?;

        Ok(total.flatten().unwrap_or(0))
    }
}
