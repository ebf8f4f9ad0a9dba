//! Pure metric functions over surveillance data.
//!
//! Every function here is stateless and total over its documented domain:
//! degenerate input is an error, never a silent NaN or zero. Quartile
//! interpolation is fixed (linear interpolation between order statistics)
//! so results are reproducible bit-for-bit for identical input order.

mod correlation;
mod descriptive;
mod growth;
mod outliers;
mod rates;

pub use correlation::pearson;
pub use descriptive::{
    mean, median, percentile, quartiles, stddev, summarize, variance, SummaryStats,
};
pub use growth::{cagr, overall_growth, yoy_growth, GrowthPoint};
pub use outliers::{iqr_outliers, Outlier, OutlierReport};
pub use rates::{incidence_rate, resistance_ratio};
