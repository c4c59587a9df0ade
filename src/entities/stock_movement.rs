use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a stock movement.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovementDirection {
    #[sea_orm(string_value = "In")]
    In,
    #[sea_orm(string_value = "Out")]
    Out,
}

/// The `stock_movements` table.
///
/// Append-only: rows are written by goods receipt and order fulfilment and
/// never updated or deleted, so trailing windows over `occurred_at` are
/// reproducible.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub product_id: Uuid,

    pub direction: MovementDirection,

    /// Quantity moved, always positive; the sign lives in `direction`.
    pub quantity: i32,

    pub occurred_at: DateTime<Utc>,

    /// Origin of the movement, e.g. "order" or "goods_receipt".
    pub reference_type: Option<String>,

    #[sea_orm(column_type = "Uuid", nullable)]
    pub reference_id: Option<Uuid>,
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
