//! The analysis engine: scope filtering, dispatch, caching, refresh.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::dataset::{
    validate, CountField, DataLoader, DataQualityIssue, Dataset, Record, Scope,
};
use crate::error::{MantouxError, Result};
use crate::metrics;

use super::kind::AnalysisKind;
use super::result::AnalysisResult;

/// A variable entering the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Var {
    Count(CountField),
    Year,
}

impl Var {
    fn name(&self) -> &'static str {
        match self {
            Var::Count(field) => field.name(),
            Var::Year => "year",
        }
    }

    fn get(&self, record: &Record) -> Option<f64> {
        match self {
            Var::Count(field) => field.get(record).map(|v| v as f64),
            Var::Year => Some(record.year as f64),
        }
    }
}

/// Variables in the correlation matrix, in payload order.
const CORRELATION_VARS: &[Var] = &[
    Var::Count(CountField::NewCases),
    Var::Count(CountField::MdrCases),
    Var::Count(CountField::XdrCases),
    Var::Year,
];

/// Strongest correlation pairs reported alongside the matrix.
const TOP_PAIRS: usize = 5;

type CacheKey = (AnalysisKind, String);

/// Shared analysis engine owning the dataset and the result cache.
///
/// The dataset is only ever replaced wholesale: readers clone the `Arc`
/// under a read lock and keep computing against that snapshot, so a
/// concurrent refresh can never hand them a half-updated dataset. The
/// cache is cleared in the same refresh, never patched.
pub struct Engine {
    loader: DataLoader,
    dataset: RwLock<Arc<Dataset>>,
    cache: RwLock<HashMap<CacheKey, Arc<AnalysisResult>>>,
}

impl Engine {
    /// Build an engine around an already-loaded dataset.
    pub fn new(dataset: Dataset, loader: DataLoader) -> Self {
        Self {
            loader,
            dataset: RwLock::new(Arc::new(dataset)),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load through the given loader and build the engine.
    pub fn from_loader(loader: DataLoader) -> Result<Self> {
        let dataset = loader.load()?;
        Ok(Self::new(dataset, loader))
    }

    /// Current dataset snapshot.
    pub fn dataset(&self) -> Arc<Dataset> {
        read_lock(&self.dataset).clone()
    }

    /// Data-quality findings for the current dataset.
    pub fn quality_report(&self) -> Vec<DataQualityIssue> {
        validate(&self.dataset())
    }

    /// Run one analysis over the scoped dataset, through the cache.
    ///
    /// Repeated identical requests between refreshes return the same
    /// `Arc<AnalysisResult>` without recomputation. The cache key carries
    /// the dataset hash, so a result computed against an already-replaced
    /// snapshot can never be served for the new one. A scope matching
    /// zero records is an error, never an empty success.
    pub fn run(&self, kind: AnalysisKind, scope: &Scope) -> Result<Arc<AnalysisResult>> {
        let snapshot = self.dataset();
        let key = (
            kind,
            format!("{}|{}", snapshot.meta.hash, scope.fingerprint()),
        );
        if let Some(hit) = read_lock(&self.cache).get(&key) {
            return Ok(hit.clone());
        }

        let scoped = snapshot.filter(scope);
        if scoped.is_empty() {
            return Err(MantouxError::InsufficientData {
                what: "scoped dataset",
                needed: 1,
                got: 0,
            });
        }

        let values = dispatch(kind, &scoped)?;
        let result = Arc::new(AnalysisResult::new(kind, scope.clone(), values));
        write_lock(&self.cache)
            .entry(key)
            .or_insert_with(|| result.clone());
        Ok(result)
    }

    /// Replace the dataset wholesale and invalidate the cache. On failure
    /// the previous dataset and cache stay in place.
    pub fn refresh(&self) -> Result<Arc<Dataset>> {
        let fresh = Arc::new(self.loader.reload()?);
        {
            let mut guard = write_lock(&self.dataset);
            *guard = fresh.clone();
        }
        write_lock(&self.cache).clear();
        Ok(fresh)
    }

    /// Number of cached analysis results.
    pub fn cached_results(&self) -> usize {
        read_lock(&self.cache).len()
    }
}

/// Read a lock even if another thread panicked while holding it; values
/// under these locks are replaced atomically, never mutated in place, so
/// a poisoned guard still holds a consistent value.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn dispatch(kind: AnalysisKind, dataset: &Dataset) -> Result<Value> {
    match kind {
        AnalysisKind::Incidence => incidence(dataset),
        AnalysisKind::MdrRatio => ratio(dataset, CountField::MdrCases, CountField::NewCases),
        AnalysisKind::XdrRatio => ratio(dataset, CountField::XdrCases, CountField::MdrCases),
        AnalysisKind::YoyGrowth => yoy(dataset),
        AnalysisKind::Cagr => cagr(dataset),
        AnalysisKind::Correlation => correlation(dataset),
        AnalysisKind::Outliers => outliers(dataset),
        AnalysisKind::SummaryStats => summary(dataset),
    }
}

/// Per-year incidence from records where both cases and population are
/// known; anything else is excluded and counted, never zero-filled.
fn incidence(dataset: &Dataset) -> Result<Value> {
    let mut by_year: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    let mut excluded = 0usize;
    for record in &dataset.records {
        match (record.new_cases, record.population) {
            (Some(cases), Some(population)) => {
                let entry = by_year.entry(record.year).or_insert((0.0, 0.0));
                entry.0 += cases as f64;
                entry.1 += population;
            }
            _ => excluded += 1,
        }
    }
    if by_year.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "incidence records",
            needed: 1,
            got: 0,
        });
    }

    let mut series = Vec::with_capacity(by_year.len());
    for (year, (cases, population)) in by_year {
        let rate = metrics::incidence_rate(cases, population)?;
        series.push(json!({
            "year": year,
            "cases": cases,
            "population": population,
            "rate": rate,
        }));
    }
    Ok(json!({ "series": series, "excluded_records": excluded }))
}

/// Per-year ratio of two count fields (MDR within new cases, XDR within
/// MDR), from records where both fields are known.
fn ratio(dataset: &Dataset, numerator: CountField, denominator: CountField) -> Result<Value> {
    let mut by_year: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    let mut excluded = 0usize;
    for record in &dataset.records {
        match (numerator.get(record), denominator.get(record)) {
            (Some(num), Some(den)) => {
                let entry = by_year.entry(record.year).or_insert((0.0, 0.0));
                entry.0 += num as f64;
                entry.1 += den as f64;
            }
            _ => excluded += 1,
        }
    }
    if by_year.is_empty() {
        return Err(MantouxError::InsufficientData {
            what: "ratio records",
            needed: 1,
            got: 0,
        });
    }

    let mut series = Vec::with_capacity(by_year.len());
    for (year, (num, den)) in by_year {
        let ratio = metrics::resistance_ratio(num, den)?;
        series.push(json!({
            "year": year,
            "numerator": num,
            "denominator": den,
            "ratio": ratio,
        }));
    }
    Ok(json!({
        "numerator": numerator.name(),
        "denominator": denominator.name(),
        "series": series,
        "excluded_records": excluded,
    }))
}

fn yoy(dataset: &Dataset) -> Result<Value> {
    let totals = dataset.yearly_totals(CountField::NewCases);
    let series: Vec<(i32, f64)> = totals
        .points
        .iter()
        .map(|&(year, value)| (year, value as f64))
        .collect();

    let growth = metrics::yoy_growth(&series)?;
    let overall = metrics::overall_growth(&series);

    let yearly: Vec<Value> = series
        .iter()
        .map(|&(year, value)| json!({ "year": year, "value": value }))
        .collect();

    Ok(json!({
        "field": CountField::NewCases.name(),
        "yearly_totals": yearly,
        "growth": growth,
        "overall_growth_pct": overall,
        "excluded_records": totals.excluded,
    }))
}

fn cagr(dataset: &Dataset) -> Result<Value> {
    let totals = dataset.yearly_totals(CountField::NewCases);
    if totals.points.len() < 2 {
        return Err(MantouxError::InsufficientData {
            what: "cagr years",
            needed: 2,
            got: totals.points.len(),
        });
    }
    let (first_year, first_value) = totals.points[0];
    let (last_year, last_value) = totals.points[totals.points.len() - 1];
    let periods = (last_year - first_year) as u32;

    let rate = metrics::cagr(first_value as f64, last_value as f64, periods)?;
    Ok(json!({
        "field": CountField::NewCases.name(),
        "from_year": first_year,
        "to_year": last_year,
        "start_value": first_value,
        "end_value": last_value,
        "periods": periods,
        "cagr": rate,
        "cagr_pct": rate * 100.0,
        "excluded_records": totals.excluded,
    }))
}

/// Correlation matrix over the standard variables plus the strongest
/// pairs. A pair whose coefficient is undefined (constant column, or too
/// few complete observations) is reported as null rather than failing the
/// whole matrix; the diagonal is 1 by convention.
fn correlation(dataset: &Dataset) -> Result<Value> {
    let mut matrix: IndexMap<String, IndexMap<String, Option<f64>>> = IndexMap::new();
    let mut pairs: Vec<(&'static str, &'static str, f64)> = Vec::new();

    for (i, &a) in CORRELATION_VARS.iter().enumerate() {
        let mut row: IndexMap<String, Option<f64>> = IndexMap::new();
        for (j, &b) in CORRELATION_VARS.iter().enumerate() {
            let r = if i == j {
                Some(1.0)
            } else {
                let (xs, ys) = paired(dataset, a, b);
                match metrics::pearson(&xs, &ys) {
                    Ok(r) => Some(r),
                    Err(MantouxError::DivisionByZero(_))
                    | Err(MantouxError::InsufficientData { .. }) => None,
                    Err(e) => return Err(e),
                }
            };
            if j > i {
                if let Some(r) = r {
                    pairs.push((a.name(), b.name(), r));
                }
            }
            row.insert(b.name().to_string(), r);
        }
        matrix.insert(a.name().to_string(), row);
    }

    pairs.sort_by(|x, y| {
        y.2.abs()
            .partial_cmp(&x.2.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_pairs: Vec<Value> = pairs
        .iter()
        .take(TOP_PAIRS)
        .map(|&(var1, var2, r)| json!({ "var1": var1, "var2": var2, "correlation": r }))
        .collect();

    let variables: Vec<&str> = CORRELATION_VARS.iter().map(|v| v.name()).collect();
    Ok(json!({
        "variables": variables,
        "matrix": matrix,
        "top_pairs": top_pairs,
    }))
}

/// Aligned value pairs from records where both variables are known.
fn paired(dataset: &Dataset, a: Var, b: Var) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for record in &dataset.records {
        if let (Some(x), Some(y)) = (a.get(record), b.get(record)) {
            xs.push(x);
            ys.push(y);
        }
    }
    (xs, ys)
}

fn outliers(dataset: &Dataset) -> Result<Value> {
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for record in &dataset.records {
        if let Some(cases) = record.new_cases {
            values.push(cases as f64);
            labels.push((record.country.as_str(), record.year));
        }
    }

    let report = metrics::iqr_outliers(&values)?;
    let flagged: Vec<Value> = report
        .outliers
        .iter()
        .map(|o| {
            let (country, year) = labels[o.index];
            json!({ "country": country, "year": year, "value": o.value })
        })
        .collect();

    Ok(json!({
        "field": CountField::NewCases.name(),
        "q1": report.q1,
        "q3": report.q3,
        "iqr": report.iqr,
        "lower_fence": report.lower_fence,
        "upper_fence": report.upper_fence,
        "observations": values.len(),
        "outliers": flagged,
    }))
}

/// Per-field summaries in declaration order. A field with no known values
/// in the scope is reported as null; all fields unknown is an error.
fn summary(dataset: &Dataset) -> Result<Value> {
    let mut fields: IndexMap<String, Option<metrics::SummaryStats>> = IndexMap::new();
    for field in [
        CountField::NewCases,
        CountField::MdrCases,
        CountField::XdrCases,
    ] {
        let values: Vec<f64> = dataset
            .records
            .iter()
            .filter_map(|r| field.get(r))
            .map(|v| v as f64)
            .collect();
        match metrics::summarize(&values) {
            Ok(stats) => {
                fields.insert(field.name().to_string(), Some(stats));
            }
            Err(MantouxError::InsufficientData { .. }) => {
                fields.insert(field.name().to_string(), None);
            }
            Err(e) => return Err(e),
        }
    }

    if fields.values().all(|s| s.is_none()) {
        return Err(MantouxError::InsufficientData {
            what: "summary fields",
            needed: 1,
            got: 0,
        });
    }
    Ok(json!({ "fields": fields }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetMeta;
    use chrono::Utc;

    fn meta() -> DatasetMeta {
        DatasetMeta {
            source: "test".to_string(),
            hash: "sha256:0".to_string(),
            row_count: 0,
            loaded_at: Utc::now(),
        }
    }

    fn record(country: &str, year: i32, cases: u64, mdr: u64, xdr: u64) -> Record {
        Record {
            country: country.to_string(),
            region: Some("SEA".to_string()),
            year,
            population: Some(1_000_000.0),
            new_cases: Some(cases),
            mdr_cases: Some(mdr),
            xdr_cases: Some(xdr),
        }
    }

    fn engine() -> Engine {
        let dataset = Dataset::new(
            vec![
                record("India", 2017, 1000, 100, 10),
                record("India", 2018, 1100, 121, 11),
                record("India", 2019, 1210, 133, 12),
                record("Nigeria", 2017, 400, 40, 4),
                record("Nigeria", 2018, 440, 48, 5),
                record("Nigeria", 2019, 484, 53, 5),
            ],
            meta(),
        );
        Engine::new(dataset, DataLoader::new())
    }

    #[test]
    fn test_incidence_per_year() {
        let engine = engine();
        let result = engine
            .run(AnalysisKind::Incidence, &Scope::all())
            .unwrap();

        let series = result.values["series"].as_array().unwrap();
        assert_eq!(series.len(), 3);
        // 2017: 1400 cases over 2M people.
        assert_eq!(series[0]["year"], 2017);
        let rate = series[0]["rate"].as_f64().unwrap();
        assert!((rate - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_mdr_ratio_denominator_is_new_cases() {
        let engine = engine();
        let result = engine.run(AnalysisKind::MdrRatio, &Scope::all()).unwrap();

        assert_eq!(result.values["denominator"], "new_cases");
        let series = result.values["series"].as_array().unwrap();
        let ratio = series[0]["ratio"].as_f64().unwrap();
        assert!((ratio - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_xdr_ratio_denominator_is_mdr_cases() {
        let engine = engine();
        let result = engine.run(AnalysisKind::XdrRatio, &Scope::all()).unwrap();
        assert_eq!(result.values["denominator"], "mdr_cases");
    }

    #[test]
    fn test_yoy_growth_scoped_to_country() {
        let engine = engine();
        let scope = Scope::all().with_country("India");
        let result = engine.run(AnalysisKind::YoyGrowth, &scope).unwrap();

        let growth = result.values["growth"].as_array().unwrap();
        assert_eq!(growth.len(), 2);
        let pct = growth[0]["pct_change"].as_f64().unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cagr_uses_year_span_as_periods() {
        let engine = engine();
        let scope = Scope::all().with_country("India");
        let result = engine.run(AnalysisKind::Cagr, &scope).unwrap();

        assert_eq!(result.values["periods"], 2);
        let rate = result.values["cagr"].as_f64().unwrap();
        // 1000 → 1210 over two periods is exactly 10% a year.
        assert!((rate - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_matrix_shape() {
        let engine = engine();
        let result = engine
            .run(AnalysisKind::Correlation, &Scope::all())
            .unwrap();

        let matrix = result.values["matrix"].as_object().unwrap();
        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix["new_cases"]["new_cases"], 1.0);

        let top = result.values["top_pairs"].as_array().unwrap();
        assert!(!top.is_empty());
        assert!(top.len() <= TOP_PAIRS);
    }

    #[test]
    fn test_outliers_labelled_with_country_and_year() {
        let mut records = vec![
            record("India", 2017, 100, 0, 0),
            record("India", 2018, 110, 0, 0),
            record("India", 2019, 95, 0, 0),
            record("Nigeria", 2017, 105, 0, 0),
            record("Nigeria", 2018, 90, 0, 0),
        ];
        records.push(record("China", 2019, 900_000, 0, 0));
        let engine = Engine::new(Dataset::new(records, meta()), DataLoader::new());

        let result = engine.run(AnalysisKind::Outliers, &Scope::all()).unwrap();
        let flagged = result.values["outliers"].as_array().unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0]["country"], "China");
        assert_eq!(flagged[0]["year"], 2019);
    }

    #[test]
    fn test_summary_stats_fields_in_order() {
        let engine = engine();
        let result = engine
            .run(AnalysisKind::SummaryStats, &Scope::all())
            .unwrap();

        let fields = result.values["fields"].as_object().unwrap();
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, vec!["new_cases", "mdr_cases", "xdr_cases"]);
        assert_eq!(fields["new_cases"]["count"], 6);
    }

    #[test]
    fn test_empty_scope_is_an_error() {
        let engine = engine();
        let scope = Scope::all().with_country("Atlantis");
        let err = engine.run(AnalysisKind::SummaryStats, &scope).unwrap_err();
        assert!(matches!(err, MantouxError::InsufficientData { .. }));
    }

    #[test]
    fn test_repeated_requests_hit_the_cache() {
        let engine = engine();
        let scope = Scope::all().with_country("India");

        let first = engine.run(AnalysisKind::SummaryStats, &scope).unwrap();
        let second = engine.run(AnalysisKind::SummaryStats, &scope).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_results(), 1);
    }

    #[test]
    fn test_refresh_failure_keeps_previous_dataset() {
        // Loader with neither a URL nor a readable cache file: reload fails.
        let engine = engine();
        let before = engine.dataset();
        let _ = engine
            .run(AnalysisKind::SummaryStats, &Scope::all())
            .unwrap();

        assert!(engine.refresh().is_err());
        assert!(Arc::ptr_eq(&before, &engine.dataset()));
        // Cache survives a failed refresh too.
        assert_eq!(engine.cached_results(), 1);
    }

    #[test]
    fn test_unknown_values_are_excluded_not_zeroed() {
        let mut sparse = record("India", 2020, 0, 0, 0);
        sparse.new_cases = None;
        sparse.population = None;
        let dataset = Dataset::new(
            vec![record("India", 2019, 100, 10, 1), sparse],
            meta(),
        );
        let engine = Engine::new(dataset, DataLoader::new());

        let result = engine.run(AnalysisKind::Incidence, &Scope::all()).unwrap();
        assert_eq!(result.values["excluded_records"], 1);
        assert_eq!(result.values["series"].as_array().unwrap().len(), 1);
    }
}
