use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all pagedrop endpoints.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.max_document_size;
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/categories", get(handler::categories_handler))
        .route("/v1/deploy", post(handler::deploy_handler))
        .route("/v1/deployments", get(handler::list_handler))
        // One parameter name per segment: `:key` is a slug for the lookup and
        // a deployment id for unpublish.
        .route("/v1/deployments/:key", get(handler::deployment_handler))
        .route("/v1/deployments/:key/unpublish", post(handler::unpublish_handler))
        .route("/p/:slug", get(handler::view_handler))
        .route("/files/*path", get(handler::file_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
