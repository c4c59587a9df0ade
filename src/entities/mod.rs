//! sea-orm entities for the shared inventory store.

pub mod product;
pub mod purchase_order;
pub mod stock_alert;
pub mod stock_movement;
