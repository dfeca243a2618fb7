//! HTTP surface. Handlers decode the payload, resolve the caller through the
//! [`AuthContext`](crate::auth::AuthContext) extractor, and delegate to the
//! services; no business rules live here.

pub mod health;
pub mod maintenance;
pub mod notifications;
pub mod tools;
pub mod work_orders;

use crate::AppState;
use axum::{routing::get, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assemble the full application router with middleware and docs.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/work-orders", work_orders::router())
        .nest("/tool-assignments", tools::router())
        .nest("/maintenance", maintenance::router())
        .nest("/notifications", notifications::router())
        .route("/health", get(health::health_check));

    Router::new()
        .merge(api)
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", crate::openapi::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
