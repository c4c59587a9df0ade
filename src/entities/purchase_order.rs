use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a purchase order. Orders are never deleted; `Sent` only
/// annotates that the document went out to the supplier.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "Created")]
    Created,
    #[sea_orm(string_value = "Sent")]
    Sent,
}

/// The `purchase_orders` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable order number, globally unique.
    pub po_number: String,

    #[sea_orm(column_type = "Uuid")]
    pub product_id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub supplier_id: Uuid,

    pub quantity_ordered: i32,

    /// Catalog price captured at issuance; later price changes do not touch
    /// issued orders.
    pub unit_price_at_issuance: Decimal,

    pub total_amount: Decimal,

    pub status: PurchaseOrderStatus,

    pub sent_method: Option<String>,

    pub sent_to: Option<String>,

    pub sent_at: Option<DateTime<Utc>>,

    pub expected_delivery_date: NaiveDate,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Days past the expected delivery date as of `today`; zero or negative
    /// when not yet due.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.expected_delivery_date).num_days()
    }
}
