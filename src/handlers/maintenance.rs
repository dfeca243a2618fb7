use crate::auth::AuthContext;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::maintenance::ScanSummary;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use chrono::Utc;

pub fn router() -> Router<AppState> {
    Router::new().route("/scan", post(scan))
}

/// Run the maintenance/insurance due sweep now (admin only)
#[utoipa::path(
    post,
    path = "/maintenance/scan",
    responses(
        (status = 200, description = "Scan summary", body = ApiResponse<ScanSummary>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "maintenance"
)]
pub async fn scan(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ServiceError> {
    auth.require_admin()?;
    let summary = state
        .services
        .maintenance
        .scan(Utc::now().date_naive())
        .await?;
    Ok(Json(ApiResponse::new(summary)))
}
