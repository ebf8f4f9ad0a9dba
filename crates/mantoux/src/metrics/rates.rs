//! Rate and ratio metrics.

use crate::error::{MantouxError, Result};

/// Cases per 100 000 population.
pub fn incidence_rate(cases: f64, population: f64) -> Result<f64> {
    if population <= 0.0 {
        return Err(MantouxError::DivisionByZero("incidence_rate population"));
    }
    Ok(cases / population * 100_000.0)
}

/// Share of a subtype within a total, as a percentage. Serves both the
/// MDR and XDR ratios.
pub fn resistance_ratio(count: f64, total: f64) -> Result<f64> {
    if total <= 0.0 {
        return Err(MantouxError::DivisionByZero("resistance_ratio total"));
    }
    Ok(count / total * 100.0)
}
