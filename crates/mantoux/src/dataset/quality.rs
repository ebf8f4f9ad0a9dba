//! Data-quality validation over a loaded dataset.
//!
//! Validation reports findings; it never fails and never mutates. A
//! dataset with findings is still analyzable, the findings tell the
//! operator what to distrust.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::record::{CountField, Record};
use super::table::Dataset;

/// Kind of data-quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Same (country, year) key appears more than once.
    DuplicateKey,
    /// xdr_cases exceeds mdr_cases.
    XdrExceedsMdr,
    /// mdr_cases exceeds new_cases.
    MdrExceedsNewCases,
    /// new_cases exceeds population.
    CasesExceedPopulation,
    /// Population is negative.
    NegativePopulation,
    /// High share of unknown values in a field.
    Completeness,
}

impl IssueKind {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::DuplicateKey => "Duplicate Key",
            IssueKind::XdrExceedsMdr => "XDR Exceeds MDR",
            IssueKind::MdrExceedsNewCases => "MDR Exceeds New Cases",
            IssueKind::CasesExceedPopulation => "Cases Exceed Population",
            IssueKind::NegativePopulation => "Negative Population",
            IssueKind::Completeness => "Completeness",
        }
    }
}

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A single data-quality finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Affected field, when the finding is field-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub description: String,
    /// Total affected records.
    pub occurrences: usize,
    /// Sample of affected record indices.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rows: Vec<usize>,
}

/// Share of unknown values above which a completeness warning is raised.
const COMPLETENESS_WARN: f64 = 0.25;
/// At most this many row indices are attached per finding.
const MAX_SAMPLE_ROWS: usize = 5;

/// Check a dataset for quality findings.
pub fn validate(dataset: &Dataset) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();
    check_duplicates(dataset, &mut issues);
    check_count_ordering(dataset, &mut issues);
    check_population(dataset, &mut issues);
    check_completeness(dataset, &mut issues);
    issues
}

fn issue(
    kind: IssueKind,
    severity: Severity,
    field: Option<&str>,
    description: String,
    rows: Vec<usize>,
) -> DataQualityIssue {
    DataQualityIssue {
        kind,
        severity,
        field: field.map(str::to_string),
        description,
        occurrences: rows.len(),
        rows: rows.into_iter().take(MAX_SAMPLE_ROWS).collect(),
    }
}

fn check_duplicates(dataset: &Dataset, issues: &mut Vec<DataQualityIssue>) {
    let mut first_seen: HashMap<(String, i32), usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for (idx, record) in dataset.records.iter().enumerate() {
        let key = (record.country.to_ascii_lowercase(), record.year);
        if first_seen.contains_key(&key) {
            duplicates.push(idx);
        } else {
            first_seen.insert(key, idx);
        }
    }
    if !duplicates.is_empty() {
        issues.push(issue(
            IssueKind::DuplicateKey,
            Severity::Error,
            None,
            format!(
                "{} records repeat an existing (country, year) key",
                duplicates.len()
            ),
            duplicates,
        ));
    }
}

fn check_count_ordering(dataset: &Dataset, issues: &mut Vec<DataQualityIssue>) {
    let mut xdr_over_mdr = Vec::new();
    let mut mdr_over_new = Vec::new();
    let mut cases_over_pop = Vec::new();

    for (idx, record) in dataset.records.iter().enumerate() {
        if let (Some(xdr), Some(mdr)) = (record.xdr_cases, record.mdr_cases) {
            if xdr > mdr {
                xdr_over_mdr.push(idx);
            }
        }
        if let (Some(mdr), Some(new)) = (record.mdr_cases, record.new_cases) {
            if mdr > new {
                mdr_over_new.push(idx);
            }
        }
        if let (Some(new), Some(pop)) = (record.new_cases, record.population) {
            if new as f64 > pop {
                cases_over_pop.push(idx);
            }
        }
    }

    if !xdr_over_mdr.is_empty() {
        let n = xdr_over_mdr.len();
        issues.push(issue(
            IssueKind::XdrExceedsMdr,
            Severity::Error,
            Some("xdr_cases"),
            format!("{} records report more XDR than MDR cases", n),
            xdr_over_mdr,
        ));
    }
    if !mdr_over_new.is_empty() {
        let n = mdr_over_new.len();
        issues.push(issue(
            IssueKind::MdrExceedsNewCases,
            Severity::Error,
            Some("mdr_cases"),
            format!("{} records report more MDR than new cases", n),
            mdr_over_new,
        ));
    }
    if !cases_over_pop.is_empty() {
        let n = cases_over_pop.len();
        issues.push(issue(
            IssueKind::CasesExceedPopulation,
            Severity::Warning,
            Some("new_cases"),
            format!("{} records report more cases than population", n),
            cases_over_pop,
        ));
    }
}

fn check_population(dataset: &Dataset, issues: &mut Vec<DataQualityIssue>) {
    let negative: Vec<usize> = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.population.is_some_and(|p| p < 0.0))
        .map(|(idx, _)| idx)
        .collect();

    if !negative.is_empty() {
        let n = negative.len();
        issues.push(issue(
            IssueKind::NegativePopulation,
            Severity::Error,
            Some("population"),
            format!("{} records carry a negative population", n),
            negative,
        ));
    }
}

fn check_completeness(dataset: &Dataset, issues: &mut Vec<DataQualityIssue>) {
    if dataset.is_empty() {
        return;
    }
    let total = dataset.len() as f64;

    let mut report = |name: &str, missing: Vec<usize>| {
        let share = missing.len() as f64 / total;
        if share > COMPLETENESS_WARN {
            let severity = if share > 0.5 {
                Severity::Warning
            } else {
                Severity::Info
            };
            issues.push(issue(
                IssueKind::Completeness,
                severity,
                Some(name),
                format!("{:.0}% of records have unknown {}", share * 100.0, name),
                missing,
            ));
        }
    };

    let missing_of = |get: &dyn Fn(&Record) -> bool| -> Vec<usize> {
        dataset
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| get(r))
            .map(|(idx, _)| idx)
            .collect()
    };

    report(
        "population",
        missing_of(&|r: &Record| r.population.is_none()),
    );
    for field in [CountField::NewCases, CountField::MdrCases, CountField::XdrCases] {
        report(field.name(), missing_of(&|r: &Record| field.get(r).is_none()));
    }
}
