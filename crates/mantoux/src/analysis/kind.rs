//! The closed set of analysis types.

use serde::{Deserialize, Serialize};

use crate::error::MantouxError;

/// Analysis types the engine can run.
///
/// Adding a variant extends [`KIND_TABLE`] and the exhaustive dispatch in
/// the engine, both checked at compile time; there is no string branching
/// past the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Incidence,
    MdrRatio,
    XdrRatio,
    YoyGrowth,
    Cagr,
    Correlation,
    Outliers,
    SummaryStats,
}

/// Name table resolving request strings to kinds.
pub const KIND_TABLE: &[(&str, AnalysisKind)] = &[
    ("incidence", AnalysisKind::Incidence),
    ("mdr_ratio", AnalysisKind::MdrRatio),
    ("xdr_ratio", AnalysisKind::XdrRatio),
    ("yoy_growth", AnalysisKind::YoyGrowth),
    ("cagr", AnalysisKind::Cagr),
    ("correlation", AnalysisKind::Correlation),
    ("outliers", AnalysisKind::Outliers),
    ("summary_stats", AnalysisKind::SummaryStats),
];

impl AnalysisKind {
    /// All kinds, in table order.
    pub fn all() -> impl Iterator<Item = AnalysisKind> {
        KIND_TABLE.iter().map(|&(_, kind)| kind)
    }

    /// Request/wire name.
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Incidence => "incidence",
            AnalysisKind::MdrRatio => "mdr_ratio",
            AnalysisKind::XdrRatio => "xdr_ratio",
            AnalysisKind::YoyGrowth => "yoy_growth",
            AnalysisKind::Cagr => "cagr",
            AnalysisKind::Correlation => "correlation",
            AnalysisKind::Outliers => "outliers",
            AnalysisKind::SummaryStats => "summary_stats",
        }
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = MantouxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        KIND_TABLE
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|&(_, kind)| kind)
            .ok_or_else(|| MantouxError::UnsupportedAnalysis(s.to_string()))
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_round_trips_through_its_name() {
        for kind in AnalysisKind::all() {
            assert_eq!(kind.name().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "SUMMARY_STATS".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::SummaryStats
        );
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let err = "regression".parse::<AnalysisKind>().unwrap_err();
        assert!(matches!(err, MantouxError::UnsupportedAnalysis(_)));
    }

    #[test]
    fn test_table_covers_all_variants() {
        assert_eq!(AnalysisKind::all().count(), KIND_TABLE.len());
    }
}
