//! Mantoux: statistical analysis engine for WHO tuberculosis surveillance
//! data.
//!
//! Mantoux loads (country, year) surveillance records from a flat cache
//! file or a remote CSV export, validates them, and computes the derived
//! metrics a dashboard consumes: incidence rates, drug-resistance ratios,
//! growth, correlation, and IQR outlier detection.
//!
//! # Core principles
//!
//! - **Explicit unknowns**: missing source values stay missing; they are
//!   never coerced to zero or folded into a denominator.
//! - **Pure metrics**: every metric function is stateless and rejects
//!   degenerate input with an error instead of returning NaN.
//! - **Whole-dataset refresh**: the dataset is only ever replaced
//!   atomically, so concurrent readers see one consistent snapshot.
//!
//! # Example
//!
//! ```no_run
//! use mantoux::{AnalysisKind, DataLoader, Engine, Scope};
//!
//! let engine = Engine::from_loader(DataLoader::new()).unwrap();
//! let scope = Scope::all().with_country("India").with_years(2015, 2020);
//! let result = engine.run(AnalysisKind::YoyGrowth, &scope).unwrap();
//!
//! println!("{}", serde_json::to_string_pretty(&result.values).unwrap());
//! ```

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod export;
pub mod metrics;
pub mod viz;

pub use analysis::{AnalysisKind, AnalysisResult, Engine};
pub use dataset::{
    validate, CountField, DataLoader, DataQualityIssue, Dataset, DatasetMeta, IssueKind,
    LoaderConfig, Record, Scope, Severity,
};
pub use error::{MantouxError, Result};
pub use metrics::SummaryStats;
pub use viz::{chart_for, ChartRegistry, ChartSpec};
