//! external-dns webhook handlers, each a thin shim over [`Provider`](crate::provider::Provider).
use axum::{Extension, Json, body::Bytes, http::StatusCode};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::SharedState;
use crate::endpoint::{Changes, DomainFilter, Endpoint};
use crate::error::AppError;

// GET /
pub async fn domain_filter(Extension(state): Extension<SharedState>) -> Json<DomainFilter> {
    Json(state.provider.domain_filter())
}

// GET /healthz
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// GET /records
pub async fn records(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<Endpoint>>, AppError> {
    let endpoints = state.provider.records().await.inspect_err(|e| {
        error!(error = %e, "error getting records");
    })?;
    Ok(Json(endpoints))
}

// POST /records
pub async fn apply_changes(
    Extension(state): Extension<SharedState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let changes: Changes = parse_body(&body, "failed to unmarshal the plan")?;

    state
        .provider
        .apply_changes(&changes)
        .await
        .inspect_err(|e| error!(error = %e, "failed to apply the plan"))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /adjustendpoints
pub async fn adjust_endpoints(
    Extension(state): Extension<SharedState>,
    body: Bytes,
) -> Result<Json<Vec<Endpoint>>, AppError> {
    let endpoints: Vec<Endpoint> = parse_body(&body, "failed to unmarshal endpoints")?;

    let adjusted = state
        .provider
        .adjust_endpoints(endpoints)
        .inspect_err(|e| error!(error = %e, "failed to adjust endpoints"))?;

    Ok(Json(adjusted))
}

// Parsed by hand: external-dns sends its own media type, not application/json.
fn parse_body<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "{what}");
        AppError::bad_request(e.to_string())
    })
}
