//! API request handlers.

mod analysis;
mod data;
mod export;

pub use analysis::*;
pub use data::*;
pub use export::*;

use serde::Deserialize;
use serde_json::{json, Value};

use mantoux::Scope;

use super::error::ApiError;

/// Common `?country=&from=&to=` scope parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub country: Option<String>,
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl ScopeQuery {
    /// Build a scope; an open-ended `from`/`to` extends to the dataset's
    /// edge on that side.
    pub fn into_scope(self) -> Result<Scope, ApiError> {
        let mut scope = Scope::all();
        if let Some(country) = self.country {
            scope = scope.with_country(country);
        }
        if self.from.is_some() || self.to.is_some() {
            let from = self.from.unwrap_or(i32::MIN);
            let to = self.to.unwrap_or(i32::MAX);
            if from > to {
                return Err(ApiError::BadRequest(format!(
                    "invalid year range: {} > {}",
                    from, to
                )));
            }
            scope = scope.with_years(from, to);
        }
        Ok(scope)
    }
}

/// Success envelope: `{"success": true, "data": ...}`.
pub fn ok(data: impl serde::Serialize) -> Result<Value, ApiError> {
    let data = serde_json::to_value(data).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json!({ "success": true, "data": data }))
}
