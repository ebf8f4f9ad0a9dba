//! Surveillance dataset: records, loading, filtering, quality checks.

mod loader;
mod quality;
mod record;
mod scope;
mod table;

pub use loader::{DataLoader, LoaderConfig};
pub use quality::{validate, DataQualityIssue, IssueKind, Severity};
pub use record::{CountField, Record};
pub use scope::Scope;
pub use table::{Dataset, DatasetMeta, RegionSummary, YearlyTotals};
