use crate::auth::AuthContext;
use crate::entities::{work_order, work_order_material};
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::work_orders::{
    AttachMaterialInput, CreateWorkOrderInput, TransitionInput, UpdateFormInput,
    UpdateMaterialPriceInput, WorkOrderFilter,
};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct WorkOrderListQuery {
    pub status: Option<work_order::WorkOrderStatus>,
    pub assignee_id: Option<Uuid>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one))
        .route("/:id/transition", post(transition))
        .route("/:id/materials", post(attach_material).get(list_materials))
        .route("/:id/form", put(update_form))
        .route("/materials/:id", delete(detach_material))
        .route("/materials/:id/price", put(update_material_price))
}

/// Create a work order in `pending`
#[utoipa::path(
    post,
    path = "/work-orders",
    request_body = CreateWorkOrderInput,
    responses(
        (status = 201, description = "Work order created", body = ApiResponse<work_order::Model>),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Customer or service not found", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(input): Json<CreateWorkOrderInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.work_orders.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(order))))
}

/// List work orders with optional status/assignee filters
#[utoipa::path(
    get,
    path = "/work-orders",
    params(WorkOrderListQuery),
    responses(
        (status = 200, description = "Work orders returned", body = ApiResponse<Vec<work_order::Model>>)
    ),
    tag = "work-orders"
)]
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<WorkOrderListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = WorkOrderFilter {
        status: query.status,
        assignee_id: query.assignee_id,
    };
    let orders = state.services.work_orders.list(filter).await?;
    Ok(Json(ApiResponse::new(orders)))
}

/// Fetch one work order
#[utoipa::path(
    get,
    path = "/work-orders/{id}",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Work order returned", body = ApiResponse<work_order::Model>),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn get_one(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.work_orders.get(id).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Move a work order through one lifecycle transition
#[utoipa::path(
    post,
    path = "/work-orders/{id}/transition",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = TransitionInput,
    responses(
        (status = 200, description = "Transition applied", body = ApiResponse<work_order::Model>),
        (status = 400, description = "Location capture failed", body = ErrorResponse),
        (status = 403, description = "Caller may not move this order", body = ErrorResponse),
        (status = 409, description = "Illegal transition", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn transition(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<TransitionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.work_orders.transition(&auth, id, input).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Attach a material, debiting warehouse stock
#[utoipa::path(
    post,
    path = "/work-orders/{id}/materials",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = AttachMaterialInput,
    responses(
        (status = 201, description = "Material attached", body = ApiResponse<work_order_material::Model>),
        (status = 409, description = "Work order is immutable", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn attach_material(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<AttachMaterialInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state
        .services
        .work_orders
        .attach_material(&auth, id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(material))))
}

/// List the materials attached to a work order
#[utoipa::path(
    get,
    path = "/work-orders/{id}/materials",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Materials returned", body = ApiResponse<Vec<work_order_material::Model>>)
    ),
    tag = "work-orders"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let materials = state.services.work_orders.list_materials(id).await?;
    Ok(Json(ApiResponse::new(materials)))
}

/// Detach a material, crediting stock back
#[utoipa::path(
    delete,
    path = "/work-orders/materials/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 204, description = "Material detached"),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Work order is immutable", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn detach_material(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.work_orders.detach_material(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Correct the snapshot price on an attached material (admin only)
#[utoipa::path(
    put,
    path = "/work-orders/materials/{id}/price",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialPriceInput,
    responses(
        (status = 200, description = "Price updated", body = ApiResponse<work_order_material::Model>),
        (status = 400, description = "Price must be positive", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn update_material_price(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMaterialPriceInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state
        .services
        .work_orders
        .update_material_price(&auth, id, input)
        .await?;
    Ok(Json(ApiResponse::new(material)))
}

/// Merge form data, description, photos, and signatures into the order
#[utoipa::path(
    put,
    path = "/work-orders/{id}/form",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = UpdateFormInput,
    responses(
        (status = 200, description = "Form updated", body = ApiResponse<work_order::Model>),
        (status = 400, description = "Form data rejected by template schema", body = ErrorResponse)
    ),
    tag = "work-orders"
)]
pub async fn update_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFormInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.work_orders.update_form(&auth, id, input).await?;
    Ok(Json(ApiResponse::new(order)))
}
