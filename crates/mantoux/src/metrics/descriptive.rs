//! Descriptive statistics: mean, variance, quartiles, field summaries.

use serde::{Deserialize, Serialize};

use crate::error::{MantouxError, Result};

/// Arithmetic mean. Fails on empty input.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "mean",
            needed: 1,
            got: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n − 1 denominator). Fails for fewer than two values
/// rather than defaulting to zero.
pub fn variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MantouxError::InsufficientData {
            what: "variance",
            needed: 2,
            got: values.len(),
        });
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation.
pub fn stddev(values: &[f64]) -> Result<f64> {
    Ok(variance(values)?.sqrt())
}

/// Percentile by linear interpolation between order statistics (type 7,
/// the same method as NumPy's default). The method is fixed here so
/// quartile-derived results are reproducible across runs and platforms.
///
/// `p` is in percent (0..=100).
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "percentile",
            needed: 1,
            got: 0,
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Ok(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Ok(sorted[lo] * (1.0 - weight) + sorted[hi] * weight)
}

/// Median (50th percentile).
pub fn median(values: &[f64]) -> Result<f64> {
    percentile(values, 50.0)
}

/// First and third quartiles.
pub fn quartiles(values: &[f64]) -> Result<(f64, f64)> {
    Ok((percentile(values, 25.0)?, percentile(values, 75.0)?))
}

/// Summary of one numeric field, shaped for the dashboard's stats panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` for a single observation, where
    /// it is undefined.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Summarize a numeric sequence.
pub fn summarize(values: &[f64]) -> Result<SummaryStats> {
    if values.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "summary",
            needed: 1,
            got: 0,
        });
    }
    let std = if values.len() >= 2 {
        Some(stddev(values)?)
    } else {
        None
    };
    Ok(SummaryStats {
        count: values.len(),
        total: values.iter().sum(),
        mean: mean(values)?,
        median: median(values)?,
        std,
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    })
}
