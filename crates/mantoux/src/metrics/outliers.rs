//! IQR-based outlier detection.

use serde::{Deserialize, Serialize};

use crate::error::{MantouxError, Result};

use super::descriptive::quartiles;

/// Fence multiplier for the Tukey rule.
const IQR_MULTIPLIER: f64 = 1.5;

/// A flagged value, in stable input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    /// Index into the input sequence.
    pub index: usize,
    pub value: f64,
}

/// Result of IQR outlier detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outliers: Vec<Outlier>,
}

/// Flag values below Q1 − 1.5·IQR or above Q3 + 1.5·IQR.
///
/// Quartiles use linear interpolation between order statistics (see
/// [`percentile`](super::descriptive::percentile)); flagged values keep
/// their input order, so identical values tie-break by position.
pub fn iqr_outliers(values: &[f64]) -> Result<OutlierReport> {
    if values.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "iqr_outliers",
            needed: 1,
            got: 0,
        });
    }
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    let lower_fence = q1 - IQR_MULTIPLIER * iqr;
    let upper_fence = q3 + IQR_MULTIPLIER * iqr;

    let outliers = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v < lower_fence || v > upper_fence)
        .map(|(index, &value)| Outlier { index, value })
        .collect();

    Ok(OutlierReport {
        q1,
        q3,
        iqr,
        lower_fence,
        upper_fence,
        outliers,
    })
}
