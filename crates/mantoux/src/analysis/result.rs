//! Analysis result type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::Scope;

use super::kind::AnalysisKind;

/// Output of one analysis run. Immutable once produced; safe to cache and
/// share by its (metric, scope) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metric: AnalysisKind,
    pub scope: Scope,
    pub computed_at: DateTime<Utc>,
    /// Metric-specific payload.
    pub values: Value,
}

impl AnalysisResult {
    pub fn new(metric: AnalysisKind, scope: Scope, values: Value) -> Self {
        Self {
            metric,
            scope,
            computed_at: Utc::now(),
            values,
        }
    }
}
