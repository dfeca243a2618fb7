//! Field-service work order coordination backend.
//!
//! Owns the work order lifecycle, the tool custody workflow, the material
//! and vehicle usage ledgers, role-targeted notification fan-out, and the
//! maintenance-due scanner. Master data and identity are external
//! collaborators reached through their tables and a signed JWT.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::maintenance::MaintenanceService;
use crate::services::notifications::NotificationService;
use crate::services::tool_custody::ToolCustodyService;
use crate::services::work_orders::WorkOrderService;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Uniform success envelope for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Service container shared across handlers.
pub struct AppServices {
    pub work_orders: WorkOrderService,
    pub tool_custody: ToolCustodyService,
    pub notifications: NotificationService,
    pub maintenance: MaintenanceService,
}

impl AppServices {
    pub fn new(db: DbPool) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self {
            work_orders: WorkOrderService::new(db.clone(), notifications.clone()),
            tool_custody: ToolCustodyService::new(db.clone(), notifications.clone()),
            maintenance: MaintenanceService::new(db.clone(), notifications.clone()),
            notifications,
        }
    }
}

/// Shared application state handed to the axum router.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<AppConfig>,
    pub services: Arc<AppServices>,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        Self {
            services: Arc::new(AppServices::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}
