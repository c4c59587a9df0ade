use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `products` table.
///
/// Catalog records are owned by the product-management surface; the alert
/// and replenishment services read them but never write them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub category: Option<String>,

    /// Units currently on hand. Maintained by the stock-movement surface.
    pub current_stock: i32,

    /// At or below this level the product is flagged for replenishment.
    pub low_stock_threshold: i32,

    pub max_stock_level: i32,

    pub reorder_point: i32,

    /// Unit of measure, e.g. "pcs" or "kg". Used in alert messages.
    pub unit: String,

    pub unit_price: Decimal,

    #[sea_orm(column_type = "Uuid", nullable)]
    pub supplier_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrders,
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when current stock has fallen to or below the threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.low_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.current_stock <= 0
    }
}
