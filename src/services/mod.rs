// Alerting pipeline
pub mod alert_generator;
pub mod alerts;

// Replenishment pipeline
pub mod purchase_orders;
pub mod replenishment;

// Reporting
pub mod forecast;

// Read-only catalog snapshot shared by the pipelines
pub mod catalog;
