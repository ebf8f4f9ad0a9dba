//! CSV export endpoint.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use mantoux::{export, AnalysisKind};

use crate::server::error::ApiError;
use crate::server::state::AppState;

use super::ScopeQuery;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// "dataset" (default) or an analysis kind name.
    pub what: Option<String>,
    pub country: Option<String>,
    pub from: Option<i32>,
    pub to: Option<i32>,
}

/// `GET /api/export/csv?what=&country=&from=&to=` - CSV download of the
/// scoped dataset or one analysis result.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let what = query.what.as_deref().unwrap_or("dataset").to_string();
    let scope = ScopeQuery {
        country: query.country,
        from: query.from,
        to: query.to,
    }
    .into_scope()?;

    let (filename, csv_text) = if what == "dataset" {
        let dataset = state.engine.dataset().filter(&scope);
        if dataset.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "no records match scope ({})",
                scope
            )));
        }
        ("tb_dataset.csv".to_string(), export::dataset_to_csv(&dataset)?)
    } else {
        let kind: AnalysisKind = what.parse()?;
        let result = state.engine.run(kind, &scope)?;
        (format!("tb_{}.csv", kind), export::result_to_csv(&result)?)
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv_text,
    ))
}
