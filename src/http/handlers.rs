//! JSON handlers for the registry facade.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::registry::core::ServiceRegistry;
use crate::registry::types::{RegistryError, ServiceEntry, ServiceMetadata};

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub metadata: ServiceMetadata,
}

/// Outcome report body.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub outcome: ReportOutcome,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutcome {
    Success,
    Failure,
}

/// Wire mapping for registry errors: NotFound → 404, CircuitOpen → 503,
/// with a machine-readable `error` code so callers can tell them apart.
pub struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            RegistryError::CircuitOpen(_) => (StatusCode::SERVICE_UNAVAILABLE, "circuit_open"),
        };
        let body = serde_json::json!({
            "error": code,
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn register(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let entry = registry
        .register(&req.name, &req.address, req.metadata)
        .await;
    (StatusCode::CREATED, Json(entry))
}

pub async fn unregister(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(name): Path<String>,
) -> StatusCode {
    if registry.unregister(&name).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn list_services(
    State(registry): State<Arc<ServiceRegistry>>,
) -> Json<Vec<ServiceEntry>> {
    Json(registry.list_all().await)
}

pub async fn list_healthy(
    State(registry): State<Arc<ServiceRegistry>>,
) -> Json<Vec<ServiceEntry>> {
    Json(registry.list_healthy().await)
}

pub async fn find_by_tag(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(tag): Path<String>,
) -> Json<Vec<ServiceEntry>> {
    Json(registry.find_by_tag(&tag).await)
}

pub async fn resolve(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(name): Path<String>,
) -> Result<Json<ServiceEntry>, ApiError> {
    let entry = registry.resolve(&name).await?;
    Ok(Json(entry))
}

pub async fn pick_by_prefix(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(prefix): Path<String>,
) -> Result<Json<ServiceEntry>, ApiError> {
    let entry = registry.pick_by_prefix(&prefix).await?;
    Ok(Json(entry))
}

pub async fn report(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(name): Path<String>,
    Json(req): Json<ReportRequest>,
) -> StatusCode {
    match req.outcome {
        ReportOutcome::Success => registry.record_success(&name).await,
        ReportOutcome::Failure => registry.record_failure(&name).await,
    }
    StatusCode::ACCEPTED
}

/// The registry's own liveness endpoint.
pub async fn health(State(registry): State<Arc<ServiceRegistry>>) -> impl IntoResponse {
    let count = registry.list_all().await.len();
    Json(serde_json::json!({
        "status": "ok",
        "services": count,
    }))
}
