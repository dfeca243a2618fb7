//! Database entities.
//!
//! The work order, custody, ledger, and notification tables are owned by this
//! service. The master-data tables (accounts, customers, products, vehicles,
//! tools, warehouses, service templates) are maintained elsewhere; we carry
//! slim read-only entities for lookups and denormalized copies.

pub mod account;
pub mod customer;
pub mod notification;
pub mod outbox_event;
pub mod product;
pub mod service_template;
pub mod tool;
pub mod tool_assignment;
pub mod vehicle;
pub mod vehicle_usage_log;
pub mod warehouse;
pub mod warehouse_stock;
pub mod work_order;
pub mod work_order_assignee;
pub mod work_order_material;
