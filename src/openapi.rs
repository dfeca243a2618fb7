//! OpenAPI document assembly.

use crate::entities::{notification, tool_assignment, work_order, work_order_material};
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::maintenance::ScanSummary;
use crate::services::tool_custody::{ApproveReturnInput, AssignToolInput, CustodyNotesInput};
use crate::services::work_orders::{
    AttachMaterialInput, CreateWorkOrderInput, TransitionInput, UpdateFormInput,
    UpdateMaterialPriceInput,
};
use crate::ApiResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "fieldops-api",
        description = "Field-service work order coordination API",
        version = env!("CARGO_PKG_VERSION")
    ),
    paths(
        handlers::work_orders::create,
        handlers::work_orders::list,
        handlers::work_orders::get_one,
        handlers::work_orders::transition,
        handlers::work_orders::attach_material,
        handlers::work_orders::list_materials,
        handlers::work_orders::detach_material,
        handlers::work_orders::update_material_price,
        handlers::work_orders::update_form,
        handlers::tools::assign,
        handlers::tools::list,
        handlers::tools::request_return,
        handlers::tools::approve_return,
        handlers::tools::reject_return,
        handlers::maintenance::scan,
        handlers::notifications::list,
        handlers::notifications::mark_read,
        handlers::health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        CreateWorkOrderInput,
        TransitionInput,
        AttachMaterialInput,
        UpdateMaterialPriceInput,
        UpdateFormInput,
        AssignToolInput,
        CustodyNotesInput,
        ApproveReturnInput,
        ScanSummary,
        handlers::health::HealthStatus,
        work_order::Model,
        work_order::WorkOrderStatus,
        work_order::WorkOrderPriority,
        work_order_material::Model,
        tool_assignment::Model,
        tool_assignment::ToolAssignmentStatus,
        notification::Model,
        notification::NotificationKind,
        ApiResponse<work_order::Model>,
        ApiResponse<Vec<work_order::Model>>,
        ApiResponse<work_order_material::Model>,
        ApiResponse<Vec<work_order_material::Model>>,
        ApiResponse<tool_assignment::Model>,
        ApiResponse<Vec<tool_assignment::Model>>,
        ApiResponse<notification::Model>,
        ApiResponse<Vec<notification::Model>>,
        ApiResponse<ScanSummary>,
    )),
    tags(
        (name = "work-orders", description = "Work order lifecycle and material ledger"),
        (name = "tool-assignments", description = "Tool custody workflow"),
        (name = "maintenance", description = "Vehicle maintenance sweeps"),
        (name = "notifications", description = "Recipient notification surface"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
