use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use pagedrop_publish::{
    Category, CategoryFilter, Deployment, DeploymentId, PublishError, PublishRequest,
    PublishService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: PublishService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(service: PublishService, config: ServerConfig) -> Self {
        Self { service, config: Arc::new(config) }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "pagedrop-server",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.config.storage.as_str(),
        "public_base_url": state.config.public_base_url,
        "slug_len": state.config.slug_len,
        "max_document_size": state.config.max_document_size,
    }))
}

// ---- Publish ----

/// Body of `POST /v1/deploy`. Presence is checked by the service, so every
/// field is optional here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployBody {
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub success: bool,
    pub id: DeploymentId,
    pub slug: String,
    pub public_url: String,
}

/// POST /v1/deploy
pub async fn deploy_handler(
    State(state): State<AppState>,
    body: Result<Json<DeployBody>, JsonRejection>,
) -> ServerResult<Json<DeployResponse>> {
    let Json(body) = body.map_err(|rejection| ServerError::Rejected {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let request = PublishRequest::from_raw(
        body.html_content.unwrap_or_default(),
        body.file_name.unwrap_or_default(),
        body.category.as_deref(),
        body.notes,
    )?;
    let receipt = state.service.publish(request).await?;
    info!(slug = %receipt.slug, id = %receipt.id, "deployed over http");
    Ok(Json(DeployResponse {
        success: true,
        id: receipt.id,
        slug: receipt.slug.to_string(),
        public_url: receipt.public_url,
    }))
}

// ---- Viewing ----

fn html(bytes: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response()
}

/// GET /p/:slug
pub async fn view_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ServerResult<Response> {
    let bytes = state.service.fetch_for_view(&slug).await?;
    Ok(html(bytes))
}

/// GET /files/*path
///
/// Only `{slug}/index.html` resolves; the lookup still goes through the
/// deployment row, so an unpublished page answers 410 here as well.
pub async fn file_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ServerResult<Response> {
    let slug = path
        .strip_suffix("/index.html")
        .filter(|slug| !slug.is_empty() && !slug.contains('/'))
        .ok_or_else(|| PublishError::NotFound(path.clone()))?;
    let bytes = state.service.fetch_for_view(slug).await?;
    Ok(html(bytes))
}

// ---- Deployments ----

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// GET /v1/deployments
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<Vec<Deployment>>> {
    let filter = CategoryFilter::parse(query.category.as_deref())
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    Ok(Json(state.service.list(filter).await?))
}

/// GET /v1/deployments/:slug
pub async fn deployment_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ServerResult<Json<Deployment>> {
    Ok(Json(state.service.get(&slug).await?))
}

/// POST /v1/deployments/:id/unpublish
pub async fn unpublish_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let id: DeploymentId = id.parse().map_err(|_| PublishError::NotFound(id.clone()))?;
    state.service.unpublish(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub value: Category,
    pub label: String,
}

/// GET /v1/categories
pub async fn categories_handler() -> Json<Vec<CategoryInfo>> {
    Json(
        Category::ALL
            .iter()
            .map(|c| CategoryInfo { value: *c, label: c.label().to_string() })
            .collect(),
    )
}
