//! Dataset inspection endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use mantoux::CountField;

use crate::server::error::ApiError;
use crate::server::state::AppState;

use super::ok;

/// Maximum number of rows returned by the preview endpoint.
const MAX_PREVIEW_ROWS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

/// `GET /api/data?limit=` - first rows of the dataset.
pub async fn data_preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<Value>, ApiError> {
    let dataset = state.engine.dataset();
    let limit = query.limit.unwrap_or(10).min(MAX_PREVIEW_ROWS);

    let rows: Vec<&mantoux::Record> = dataset.records.iter().take(limit).collect();
    let truncated = dataset.len() > limit;

    Ok(Json(ok(json!({
        "rows": rows,
        "total_rows": dataset.len(),
        "truncated": truncated,
    }))?))
}

/// `GET /api/overview` - dataset shape and coverage.
pub async fn overview(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let dataset = state.engine.dataset();

    let missing_population = dataset
        .records
        .iter()
        .filter(|r| r.population.is_none())
        .count();
    let mut missing_counts = serde_json::Map::new();
    missing_counts.insert("population".to_string(), json!(missing_population));
    for field in [
        CountField::NewCases,
        CountField::MdrCases,
        CountField::XdrCases,
    ] {
        let count = dataset
            .records
            .iter()
            .filter(|r| field.get(r).is_none())
            .count();
        missing_counts.insert(field.name().to_string(), json!(count));
    }

    Ok(Json(ok(json!({
        "rows": dataset.len(),
        "countries": dataset.countries().len(),
        "year_range": dataset.year_bounds(),
        "missing_values": missing_counts,
        "source": dataset.meta.source,
        "loaded_at": dataset.meta.loaded_at,
    }))?))
}

/// `GET /api/quality` - data-quality findings.
pub async fn quality(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let issues = state.engine.quality_report();
    Ok(Json(ok(issues)?))
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub metric: Option<String>,
    pub n: Option<usize>,
}

/// `GET /api/top-countries?metric=&n=` - highest-burden countries.
pub async fn top_countries(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Value>, ApiError> {
    let field = parse_field(query.metric)?;
    let n = query.n.unwrap_or(10);

    let dataset = state.engine.dataset();
    let ranked: Vec<Value> = dataset
        .top_countries(field, n)
        .into_iter()
        .map(|(country, total)| json!({ "country": country, "total": total }))
        .collect();

    Ok(Json(ok(json!({ "metric": field.name(), "countries": ranked }))?))
}

/// `GET /api/regions?metric=` - per-region aggregates.
pub async fn region_summary(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Value>, ApiError> {
    let field = parse_field(query.metric)?;

    let dataset = state.engine.dataset();
    Ok(Json(ok(json!({
        "metric": field.name(),
        "regions": dataset.region_totals(field),
    }))?))
}

fn parse_field(metric: Option<String>) -> Result<CountField, ApiError> {
    match metric {
        None => Ok(CountField::NewCases),
        Some(name) => name.parse().map_err(ApiError::BadRequest),
    }
}
