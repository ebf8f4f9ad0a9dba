//! Growth metrics: year-over-year change and CAGR.

use serde::{Deserialize, Serialize};

use crate::error::{MantouxError, Result};

/// One year's change relative to the previous year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub year: i32,
    pub value: f64,
    /// Percent change from the previous year; `None` when the previous
    /// value is zero and the change is undefined.
    pub pct_change: Option<f64>,
}

/// Year-over-year growth across a year-ordered series.
///
/// A zero base makes that single year's growth undefined without failing
/// the rest of the series.
pub fn yoy_growth(series: &[(i32, f64)]) -> Result<Vec<GrowthPoint>> {
    if series.len() < 2 {
        return Err(MantouxError::InsufficientData {
            what: "yoy_growth",
            needed: 2,
            got: series.len(),
        });
    }
    let mut points = Vec::with_capacity(series.len() - 1);
    for window in series.windows(2) {
        let (_, prev) = window[0];
        let (year, value) = window[1];
        let pct_change = if prev == 0.0 {
            None
        } else {
            Some((value - prev) / prev * 100.0)
        };
        points.push(GrowthPoint {
            year,
            value,
            pct_change,
        });
    }
    Ok(points)
}

/// Change between the first and last value of a series, as a percentage.
/// Undefined (`None`) for fewer than two points or a zero start.
pub fn overall_growth(series: &[(i32, f64)]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?.1;
    let last = series.last()?.1;
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Compound annual growth rate over `periods` periods.
pub fn cagr(v0: f64, vn: f64, periods: u32) -> Result<f64> {
    if periods == 0 {
        return Err(MantouxError::InsufficientData {
            what: "cagr periods",
            needed: 1,
            got: 0,
        });
    }
    if v0 <= 0.0 {
        return Err(MantouxError::DivisionByZero("cagr base value"));
    }
    Ok((vn / v0).powf(1.0 / periods as f64) - 1.0)
}
