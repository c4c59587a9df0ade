use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of condition an alert reports.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
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
pub enum AlertType {
    #[sea_orm(string_value = "LowStock")]
    LowStock,
    #[sea_orm(string_value = "OutOfStock")]
    OutOfStock,
    #[sea_orm(string_value = "OverdueReplenishment")]
    OverdueReplenishment,
}

/// Alert severity. Stored as an integer so SQL `ORDER BY priority` follows
/// rank; variants are declared ascending so the derived `Ord` agrees.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertPriority {
    #[sea_orm(num_value = 1)]
    Low,
    #[sea_orm(num_value = 2)]
    Medium,
    #[sea_orm(num_value = 3)]
    High,
    #[sea_orm(num_value = 4)]
    Critical,
}

/// Lifecycle state of an alert.
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
pub enum AlertStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Acknowledged")]
    Acknowledged,
    #[sea_orm(string_value = "Ignored")]
    Ignored,
    #[sea_orm(string_value = "Resolved")]
    Resolved,
}

impl AlertStatus {
    /// Ignored and Resolved accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, AlertStatus::Ignored | AlertStatus::Resolved)
    }
}

/// Severity of a stock shortfall: critical when fully depleted, high when
/// remaining stock is at half the threshold or less, medium for any other
/// at-or-below-threshold level. Integer arithmetic, so stock 2 against
/// threshold 5 lands in the high band (2*2 <= 5).
pub fn priority_for(current_stock: i32, low_stock_threshold: i32) -> AlertPriority {
    if current_stock <= 0 {
        AlertPriority::Critical
    } else if 2 * current_stock <= low_stock_threshold {
        AlertPriority::High
    } else {
        AlertPriority::Medium
    }
}

/// Severity of an overdue purchase order from how many days late it is.
pub fn overdue_priority_for(days_overdue: i64) -> AlertPriority {
    if days_overdue > 7 {
        AlertPriority::High
    } else if days_overdue > 3 {
        AlertPriority::Medium
    } else {
        AlertPriority::Low
    }
}

/// The `stock_alerts` table.
///
/// `related_id` points at a product for stock alerts and at a purchase
/// order for overdue-replenishment alerts. A partial unique index on
/// `(related_id, alert_type) WHERE status = 'Active'` holds the line on at
/// most one active alert per subject and type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub alert_type: AlertType,

    pub priority: AlertPriority,

    #[sea_orm(column_type = "Uuid")]
    pub related_id: Uuid,

    pub title: String,

    pub message: String,

    pub status: AlertStatus,

    pub ignore_reason: Option<String>,

    #[sea_orm(column_type = "Uuid", nullable)]
    pub resolving_purchase_order_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds an active shortfall alert for a product at or below its
    /// threshold. Priority is fixed here and never recomputed while the
    /// alert lives.
    pub fn for_shortfall(product: &super::product::Model) -> Self {
        let now = Utc::now();
        let alert_type = if product.is_out_of_stock() {
            AlertType::OutOfStock
        } else {
            AlertType::LowStock
        };
        let title = match alert_type {
            AlertType::OutOfStock => format!("Out of stock: {}", product.name),
            _ => format!("Low stock: {}", product.name),
        };
        let message = format!(
            "{} has {} {} on hand (threshold {})",
            product.name, product.current_stock, product.unit, product.low_stock_threshold
        );

        Self {
            id: Uuid::new_v4(),
            alert_type,
            priority: priority_for(product.current_stock, product.low_stock_threshold),
            related_id: product.id,
            title,
            message,
            status: AlertStatus::Active,
            ignore_reason: None,
            resolving_purchase_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds an active overdue-replenishment alert keyed by the late
    /// purchase order.
    pub fn for_overdue_order(po: &super::purchase_order::Model, days_overdue: i64) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            alert_type: AlertType::OverdueReplenishment,
            priority: overdue_priority_for(days_overdue),
            related_id: po.id,
            title: format!("Replenishment overdue: {}", po.po_number),
            message: format!(
                "Purchase order {} was expected on {} and is {} day(s) late",
                po.po_number, po.expected_delivery_date, days_overdue
            ),
            status: AlertStatus::Active,
            ignore_reason: None,
            resolving_purchase_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depleted_stock_is_critical() {
        assert_eq!(priority_for(0, 5), AlertPriority::Critical);
        assert_eq!(priority_for(-3, 5), AlertPriority::Critical);
    }

    #[test]
    fn half_threshold_or_less_is_high() {
        assert_eq!(priority_for(5, 10), AlertPriority::High);
        assert_eq!(priority_for(2, 10), AlertPriority::High);
        assert_eq!(priority_for(2, 5), AlertPriority::High);
        assert_eq!(priority_for(1, 2), AlertPriority::High);
    }

    #[test]
    fn above_half_threshold_is_medium() {
        assert_eq!(priority_for(6, 10), AlertPriority::Medium);
        assert_eq!(priority_for(7, 10), AlertPriority::Medium);
        assert_eq!(priority_for(3, 5), AlertPriority::Medium);
        assert_eq!(priority_for(10, 10), AlertPriority::Medium);
    }

    #[test]
    fn overdue_tiers() {
        assert_eq!(overdue_priority_for(10), AlertPriority::High);
        assert_eq!(overdue_priority_for(8), AlertPriority::High);
        assert_eq!(overdue_priority_for(7), AlertPriority::Medium);
        assert_eq!(overdue_priority_for(5), AlertPriority::Medium);
        assert_eq!(overdue_priority_for(4), AlertPriority::Medium);
        assert_eq!(overdue_priority_for(3), AlertPriority::Low);
        assert_eq!(overdue_priority_for(1), AlertPriority::Low);
    }

    #[test]
    fn priority_ranks_ascend() {
        assert!(AlertPriority::Critical > AlertPriority::High);
        assert!(AlertPriority::High > AlertPriority::Medium);
        assert!(AlertPriority::Medium > AlertPriority::Low);
    }

    #[test]
    fn terminal_states() {
        assert!(!AlertStatus::Active.is_terminal());
        assert!(!AlertStatus::Acknowledged.is_terminal());
        assert!(AlertStatus::Ignored.is_terminal());
        assert!(AlertStatus::Resolved.is_terminal());
    }
}
