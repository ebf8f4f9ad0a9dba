//! Scope: filter criteria narrowing a dataset before analysis.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::record::Record;

/// A filter specification (country, inclusive year range) applied to a
/// dataset before metric computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Restrict to one country (case-insensitive exact match).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Inclusive (from, to) year range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<(i32, i32)>,
}

impl Scope {
    /// The unrestricted scope.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_years(mut self, from: i32, to: i32) -> Self {
        self.years = Some((from, to));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.country.is_none() && self.years.is_none()
    }

    /// Whether a record falls inside this scope.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ref country) = self.country {
            if !record.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some((from, to)) = self.years {
            if record.year < from || record.year > to {
                return false;
            }
        }
        true
    }

    /// Stable fingerprint of this scope, used in analysis cache keys.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match self.country {
            Some(ref c) => hasher.update(c.to_ascii_lowercase().as_bytes()),
            None => hasher.update(b"*"),
        }
        hasher.update([0u8]);
        if let Some((from, to)) = self.years {
            hasher.update(from.to_le_bytes());
            hasher.update(to.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.country, self.years) {
            (None, None) => write!(f, "all records"),
            (Some(c), None) => write!(f, "{}", c),
            (None, Some((from, to))) => write!(f, "{}-{}", from, to),
            (Some(c), Some((from, to))) => write!(f, "{} {}-{}", c, from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, year: i32) -> Record {
        Record {
            country: country.to_string(),
            region: None,
            year,
            population: None,
            new_cases: None,
            mdr_cases: None,
            xdr_cases: None,
        }
    }

    #[test]
    fn test_unrestricted_matches_everything() {
        let scope = Scope::all();
        assert!(scope.is_unrestricted());
        assert!(scope.matches(&record("India", 2015)));
    }

    #[test]
    fn test_country_match_is_case_insensitive() {
        let scope = Scope::all().with_country("india");
        assert!(scope.matches(&record("India", 2015)));
        assert!(!scope.matches(&record("Nigeria", 2015)));
    }

    #[test]
    fn test_year_range_is_inclusive() {
        let scope = Scope::all().with_years(2010, 2015);
        assert!(scope.matches(&record("India", 2010)));
        assert!(scope.matches(&record("India", 2015)));
        assert!(!scope.matches(&record("India", 2016)));
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let a = Scope::all().with_country("India").with_years(2010, 2015);
        let b = Scope::all().with_country("INDIA").with_years(2010, 2015);
        let c = Scope::all().with_country("India").with_years(2010, 2016);

        assert_eq!(a.fingerprint(), a.fingerprint());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), Scope::all().fingerprint());
    }
}
