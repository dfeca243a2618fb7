use crate::auth::AuthContext;
use crate::entities::tool_assignment;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::tool_custody::{
    ApproveReturnInput, AssignToolInput, CustodyNotesInput, ToolAssignmentFilter,
};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ToolAssignmentListQuery {
    pub assigned_to: Option<Uuid>,
    pub status: Option<tool_assignment::ToolAssignmentStatus>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(assign).get(list))
        .route("/:id/request-return", post(request_return))
        .route("/:id/approve-return", post(approve_return))
        .route("/:id/reject-return", post(reject_return))
}

/// Assign a tool to a base-role account (admin only)
#[utoipa::path(
    post,
    path = "/tool-assignments",
    request_body = AssignToolInput,
    responses(
        (status = 201, description = "Tool assigned", body = ApiResponse<tool_assignment::Model>),
        (status = 400, description = "Assignee not eligible", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Tool already in custody", body = ErrorResponse)
    ),
    tag = "tool-assignments"
)]
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(input): Json<AssignToolInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignment = state.services.tool_custody.assign(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(assignment))))
}

/// List tool assignments with optional holder/status filters
#[utoipa::path(
    get,
    path = "/tool-assignments",
    params(ToolAssignmentListQuery),
    responses(
        (status = 200, description = "Assignments returned", body = ApiResponse<Vec<tool_assignment::Model>>)
    ),
    tag = "tool-assignments"
)]
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ToolAssignmentListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = ToolAssignmentFilter {
        assigned_to: query.assigned_to,
        status: query.status,
    };
    let assignments = state.services.tool_custody.list(filter).await?;
    Ok(Json(ApiResponse::new(assignments)))
}

/// Ask to return a held tool (holder only)
#[utoipa::path(
    post,
    path = "/tool-assignments/{id}/request-return",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = CustodyNotesInput,
    responses(
        (status = 200, description = "Return requested", body = ApiResponse<tool_assignment::Model>),
        (status = 403, description = "Caller is not the holder", body = ErrorResponse),
        (status = 409, description = "Assignment is not in the assigned state", body = ErrorResponse)
    ),
    tag = "tool-assignments"
)]
pub async fn request_return(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<CustodyNotesInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignment = state
        .services
        .tool_custody
        .request_return(&auth, id, input)
        .await?;
    Ok(Json(ApiResponse::new(assignment)))
}

/// Approve a pending return into the given warehouse (admin only)
#[utoipa::path(
    post,
    path = "/tool-assignments/{id}/approve-return",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = ApproveReturnInput,
    responses(
        (status = 200, description = "Return approved", body = ApiResponse<tool_assignment::Model>),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "No pending return request", body = ErrorResponse)
    ),
    tag = "tool-assignments"
)]
pub async fn approve_return(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<ApproveReturnInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignment = state
        .services
        .tool_custody
        .approve_return(&auth, id, input)
        .await?;
    Ok(Json(ApiResponse::new(assignment)))
}

/// Reject a pending return, custody stays with the holder (admin only)
#[utoipa::path(
    post,
    path = "/tool-assignments/{id}/reject-return",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = CustodyNotesInput,
    responses(
        (status = 200, description = "Return rejected", body = ApiResponse<tool_assignment::Model>),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "No pending return request", body = ErrorResponse)
    ),
    tag = "tool-assignments"
)]
pub async fn reject_return(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(input): Json<CustodyNotesInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignment = state
        .services
        .tool_custody
        .reject_return(&auth, id, input)
        .await?;
    Ok(Json(ApiResponse::new(assignment)))
}
