use crate::auth::AuthContext;
use crate::entities::notification;
use crate::errors::{ErrorResponse, ServiceError};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id/read", put(mark_read))
}

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications returned", body = ApiResponse<Vec<notification::Model>>)
    ),
    tag = "notifications"
)]
pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.notifications.list_own(&auth).await?;
    Ok(Json(ApiResponse::new(rows)))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<notification::Model>),
        (status = 403, description = "Not the recipient", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let row = state.services.notifications.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::new(row)))
}
