//! Surveillance record types.

use serde::{Deserialize, Serialize};

/// One (country, year) surveillance observation.
///
/// Missing source values are `None` rather than zero so that unknowns
/// never leak into sums or denominators. The chain
/// `xdr_cases <= mdr_cases <= new_cases <= population` is expected but
/// not enforced here; violations surface as data-quality findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// WHO country name.
    pub country: String,
    /// WHO region code (AFR, AMR, EMR, EUR, SEA, WPR) when present.
    pub region: Option<String>,
    pub year: i32,
    pub population: Option<f64>,
    /// Lab-confirmed new pulmonary cases.
    pub new_cases: Option<u64>,
    /// Multidrug-resistant subset of `new_cases`.
    pub mdr_cases: Option<u64>,
    /// Extensively drug-resistant subset of `mdr_cases`.
    pub xdr_cases: Option<u64>,
}

impl Record {
    /// Logical key; duplicates of it are a data-quality error.
    pub fn key(&self) -> (&str, i32) {
        (self.country.as_str(), self.year)
    }
}

/// The count fields a record carries, for aggregation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountField {
    NewCases,
    MdrCases,
    XdrCases,
}

impl CountField {
    /// Column name used in payloads and exports.
    pub fn name(&self) -> &'static str {
        match self {
            CountField::NewCases => "new_cases",
            CountField::MdrCases => "mdr_cases",
            CountField::XdrCases => "xdr_cases",
        }
    }

    /// Read this field from a record.
    pub fn get(&self, record: &Record) -> Option<u64> {
        match self {
            CountField::NewCases => record.new_cases,
            CountField::MdrCases => record.mdr_cases,
            CountField::XdrCases => record.xdr_cases,
        }
    }
}

impl std::str::FromStr for CountField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new_cases" | "cases" => Ok(CountField::NewCases),
            "mdr_cases" | "mdr" => Ok(CountField::MdrCases),
            "xdr_cases" | "xdr" => Ok(CountField::XdrCases),
            _ => Err(format!(
                "Unknown field: {}. Use new_cases, mdr_cases, or xdr_cases.",
                s
            )),
        }
    }
}

impl std::fmt::Display for CountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
