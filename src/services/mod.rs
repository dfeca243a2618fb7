//! Business services.
//!
//! Handlers stay thin; each operation here takes a typed payload plus the
//! resolved [`AuthContext`](crate::auth::AuthContext) and owns its own
//! transaction boundary. State writes and their outbox rows commit together;
//! notification fan-out runs after commit and never fails the operation.

pub mod maintenance;
pub mod notifications;
pub(crate) mod stock;
pub mod tool_custody;
pub mod work_orders;
