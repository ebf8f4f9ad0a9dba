//! Analysis and chart endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use mantoux::{viz, AnalysisKind};

use crate::server::error::ApiError;
use crate::server::state::AppState;

use super::{ok, ScopeQuery};

/// `GET /api/analysis/:kind?country=&from=&to=`
pub async fn run_analysis(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    // Parse before any dataset access; unknown kinds never touch data.
    let kind: AnalysisKind = kind.parse()?;
    let scope = query.into_scope()?;

    tracing::debug!(kind = %kind, scope = %scope, "running analysis");
    let result = state.engine.run(kind, &scope)?;
    Ok(Json(ok(&*result)?))
}

/// `GET /api/chart/:kind?country=&from=&to=` - analysis rendered as a
/// chart-ready `{data, layout}` spec.
pub async fn chart(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let kind: AnalysisKind = kind.parse()?;
    let scope = query.into_scope()?;

    let result = state.engine.run(kind, &scope)?;
    let spec = viz::chart_for(&result)?;
    Ok(Json(ok(spec)?))
}

/// `GET /api/refresh-data` - wholesale dataset reload. On failure the
/// previous dataset keeps serving.
pub async fn refresh_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let engine = state.engine.clone();
    // The fetch is blocking I/O with a bounded timeout; keep it off the
    // async workers.
    let dataset = tokio::task::spawn_blocking(move || engine.refresh())
        .await
        .map_err(|e| ApiError::Internal(format!("refresh task: {}", e)))??;

    tracing::info!(rows = dataset.len(), source = %dataset.meta.source, "dataset refreshed");
    Ok(Json(ok(serde_json::json!({
        "rows": dataset.len(),
        "source": dataset.meta.source,
        "hash": dataset.meta.hash,
        "loaded_at": dataset.meta.loaded_at,
    }))?))
}
