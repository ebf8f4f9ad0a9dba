//! In-memory dataset: an ordered sequence of surveillance records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::record::{CountField, Record};
use super::scope::Scope;

/// Provenance for a loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Where the records came from (cache path or URL).
    pub source: String,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Number of data rows.
    pub row_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Yearly sums of one count field, sorted by year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    /// (year, sum of known values) pairs in ascending year order.
    pub points: Vec<(i32, u64)>,
    /// Records skipped because the field was unknown.
    pub excluded: usize,
}

/// Aggregate for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub total: u64,
    /// Mean over known values; `None` when the region has none.
    pub mean: Option<f64>,
    /// Records in the region, known or not.
    pub records: usize,
}

/// An ordered collection of surveillance records, logically keyed by
/// (country, year). Refreshed only by wholesale replacement; filtering
/// produces a new dataset and never mutates the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: DatasetMeta,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, meta: DatasetMeta) -> Self {
        Self { meta, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset containing only records matching the scope, in the
    /// original order.
    pub fn filter(&self, scope: &Scope) -> Dataset {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| scope.matches(r))
            .cloned()
            .collect();

        let meta = DatasetMeta {
            row_count: records.len(),
            ..self.meta.clone()
        };
        Dataset::new(records, meta)
    }

    /// Earliest and latest year present.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.records.iter().map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Unique country names in first-seen order.
    pub fn countries(&self) -> Vec<String> {
        let mut seen: IndexMap<&str, ()> = IndexMap::new();
        for record in &self.records {
            seen.entry(record.country.as_str()).or_insert(());
        }
        seen.keys().map(|c| c.to_string()).collect()
    }

    /// Sum a count field per year, skipping unknown values.
    pub fn yearly_totals(&self, field: CountField) -> YearlyTotals {
        let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
        let mut excluded = 0usize;
        for record in &self.records {
            match field.get(record) {
                Some(value) => *by_year.entry(record.year).or_insert(0) += value,
                None => excluded += 1,
            }
        }
        YearlyTotals {
            points: by_year.into_iter().collect(),
            excluded,
        }
    }

    /// Top `n` countries by the summed field, descending; ties keep
    /// first-seen order.
    pub fn top_countries(&self, field: CountField, n: usize) -> Vec<(String, u64)> {
        let mut totals: IndexMap<&str, u64> = IndexMap::new();
        for record in &self.records {
            if let Some(value) = field.get(record) {
                *totals.entry(record.country.as_str()).or_insert(0) += value;
            }
        }
        let mut ranked: Vec<(String, u64)> = totals
            .into_iter()
            .map(|(country, total)| (country.to_string(), total))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Per-region aggregates of a count field, regions in first-seen
    /// order; records without a region land under "unknown".
    pub fn region_totals(&self, field: CountField) -> IndexMap<String, RegionSummary> {
        let mut acc: IndexMap<String, (u64, usize, usize)> = IndexMap::new();
        for record in &self.records {
            let region = record.region.as_deref().unwrap_or("unknown");
            let entry = acc.entry(region.to_string()).or_insert((0, 0, 0));
            entry.2 += 1;
            if let Some(value) = field.get(record) {
                entry.0 += value;
                entry.1 += 1;
            }
        }
        acc.into_iter()
            .map(|(region, (total, known, records))| {
                let mean = if known > 0 {
                    Some(total as f64 / known as f64)
                } else {
                    None
                };
                (
                    region,
                    RegionSummary {
                        total,
                        mean,
                        records,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> DatasetMeta {
        DatasetMeta {
            source: "test".to_string(),
            hash: "sha256:0".to_string(),
            row_count: 0,
            loaded_at: Utc::now(),
        }
    }

    fn record(country: &str, region: &str, year: i32, cases: Option<u64>) -> Record {
        Record {
            country: country.to_string(),
            region: Some(region.to_string()),
            year,
            population: None,
            new_cases: cases,
            mdr_cases: None,
            xdr_cases: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                record("India", "SEA", 2018, Some(1000)),
                record("India", "SEA", 2019, Some(1200)),
                record("Nigeria", "AFR", 2018, Some(400)),
                record("Nigeria", "AFR", 2019, None),
                record("Peru", "AMR", 2019, Some(50)),
            ],
            meta(),
        )
    }

    #[test]
    fn test_filter_preserves_order_and_source() {
        let ds = dataset();
        let scoped = ds.filter(&Scope::all().with_years(2019, 2019));

        assert_eq!(scoped.len(), 3);
        assert_eq!(scoped.records[0].country, "India");
        assert_eq!(scoped.records[2].country, "Peru");
        // Source untouched.
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn test_yearly_totals_skip_unknowns() {
        let totals = dataset().yearly_totals(CountField::NewCases);
        assert_eq!(totals.points, vec![(2018, 1400), (2019, 1250)]);
        assert_eq!(totals.excluded, 1);
    }

    #[test]
    fn test_top_countries_descending() {
        let top = dataset().top_countries(CountField::NewCases, 2);
        assert_eq!(
            top,
            vec![("India".to_string(), 2200), ("Nigeria".to_string(), 400)]
        );
    }

    #[test]
    fn test_region_totals() {
        let regions = dataset().region_totals(CountField::NewCases);
        let afr = &regions["AFR"];
        assert_eq!(afr.total, 400);
        assert_eq!(afr.records, 2);
        // Mean over the single known value, not over both records.
        assert_eq!(afr.mean, Some(400.0));
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(dataset().year_bounds(), Some((2018, 2019)));
        assert_eq!(Dataset::new(Vec::new(), meta()).year_bounds(), None);
    }
}
