//! Chart adapter: converts analysis results into chart-library-neutral
//! `{data, layout}` specs for the browser-side chart loader.
//!
//! The adapter owns a component-local registry keyed by chart element id
//! with an explicit create/update/dispose lifecycle; nothing here depends
//! on any plotting library's internals.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::analysis::{AnalysisKind, AnalysisResult};
use crate::error::Result;

/// A renderable chart: trace data plus layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl ChartSpec {
    fn new(data: Vec<Value>, title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            data,
            layout: json!({
                "title": title,
                "xaxis": { "title": x_title },
                "yaxis": { "title": y_title },
            }),
        }
    }
}

/// Build a chart spec for an analysis result: lines for time series, bars
/// for growth, a heatmap for the correlation matrix, markers for
/// outliers.
pub fn chart_for(result: &AnalysisResult) -> Result<ChartSpec> {
    match result.metric {
        AnalysisKind::Incidence => series_line(result, "rate", "TB incidence per 100k", "Rate"),
        AnalysisKind::MdrRatio => series_line(result, "ratio", "MDR-TB share of new cases", "%"),
        AnalysisKind::XdrRatio => series_line(result, "ratio", "XDR-TB share of MDR cases", "%"),
        AnalysisKind::YoyGrowth => growth_bars(result),
        AnalysisKind::Cagr => cagr_endpoints(result),
        AnalysisKind::Correlation => correlation_heatmap(result),
        AnalysisKind::Outliers => outlier_markers(result),
        AnalysisKind::SummaryStats => summary_bars(result),
    }
}

#[derive(Deserialize)]
struct SeriesPayload {
    series: Vec<SeriesPoint>,
}

#[derive(Deserialize)]
struct SeriesPoint {
    year: i32,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    ratio: Option<f64>,
}

fn series_line(result: &AnalysisResult, field: &str, title: &str, y_title: &str) -> Result<ChartSpec> {
    let payload: SeriesPayload = serde_json::from_value(result.values.clone())?;
    let years: Vec<i32> = payload.series.iter().map(|p| p.year).collect();
    let values: Vec<Option<f64>> = payload
        .series
        .iter()
        .map(|p| if field == "rate" { p.rate } else { p.ratio })
        .collect();

    let trace = json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": field,
        "x": years,
        "y": values,
    });
    Ok(ChartSpec::new(vec![trace], title, "Year", y_title))
}

#[derive(Deserialize)]
struct GrowthPayload {
    yearly_totals: Vec<YearValue>,
    growth: Vec<GrowthEntry>,
}

#[derive(Deserialize)]
struct YearValue {
    year: i32,
    value: f64,
}

#[derive(Deserialize)]
struct GrowthEntry {
    year: i32,
    pct_change: Option<f64>,
}

fn growth_bars(result: &AnalysisResult) -> Result<ChartSpec> {
    let payload: GrowthPayload = serde_json::from_value(result.values.clone())?;

    let totals = json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": "yearly total",
        "x": payload.yearly_totals.iter().map(|p| p.year).collect::<Vec<_>>(),
        "y": payload.yearly_totals.iter().map(|p| p.value).collect::<Vec<_>>(),
    });
    let growth = json!({
        "type": "bar",
        "name": "YoY change (%)",
        "x": payload.growth.iter().map(|p| p.year).collect::<Vec<_>>(),
        "y": payload.growth.iter().map(|p| p.pct_change).collect::<Vec<_>>(),
        "yaxis": "y2",
    });

    let mut spec = ChartSpec::new(
        vec![totals, growth],
        "New TB cases and year-over-year change",
        "Year",
        "Cases",
    );
    spec.layout["yaxis2"] = json!({ "title": "% change", "overlaying": "y", "side": "right" });
    Ok(spec)
}

#[derive(Deserialize)]
struct CagrPayload {
    from_year: i32,
    to_year: i32,
    start_value: f64,
    end_value: f64,
    cagr_pct: f64,
}

fn cagr_endpoints(result: &AnalysisResult) -> Result<ChartSpec> {
    let payload: CagrPayload = serde_json::from_value(result.values.clone())?;
    let trace = json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": format!("CAGR {:.2}%/yr", payload.cagr_pct),
        "x": [payload.from_year, payload.to_year],
        "y": [payload.start_value, payload.end_value],
    });
    Ok(ChartSpec::new(
        vec![trace],
        "Compound annual growth",
        "Year",
        "Cases",
    ))
}

#[derive(Deserialize)]
struct CorrelationPayload {
    variables: Vec<String>,
    matrix: IndexMap<String, IndexMap<String, Option<f64>>>,
}

fn correlation_heatmap(result: &AnalysisResult) -> Result<ChartSpec> {
    let payload: CorrelationPayload = serde_json::from_value(result.values.clone())?;
    let z: Vec<Vec<Option<f64>>> = payload
        .variables
        .iter()
        .map(|row_var| {
            payload
                .variables
                .iter()
                .map(|col_var| {
                    payload
                        .matrix
                        .get(row_var)
                        .and_then(|row| row.get(col_var))
                        .copied()
                        .flatten()
                })
                .collect()
        })
        .collect();

    let trace = json!({
        "type": "heatmap",
        "x": payload.variables,
        "y": payload.variables,
        "z": z,
        "zmin": -1.0,
        "zmax": 1.0,
    });
    Ok(ChartSpec::new(
        vec![trace],
        "Correlation of key indicators",
        "",
        "",
    ))
}

#[derive(Deserialize)]
struct OutliersPayload {
    upper_fence: f64,
    lower_fence: f64,
    outliers: Vec<OutlierEntry>,
}

#[derive(Deserialize)]
struct OutlierEntry {
    country: String,
    year: i32,
    value: f64,
}

fn outlier_markers(result: &AnalysisResult) -> Result<ChartSpec> {
    let payload: OutliersPayload = serde_json::from_value(result.values.clone())?;
    let labels: Vec<String> = payload
        .outliers
        .iter()
        .map(|o| format!("{} {}", o.country, o.year))
        .collect();
    let trace = json!({
        "type": "scatter",
        "mode": "markers",
        "name": "outliers",
        "x": labels,
        "y": payload.outliers.iter().map(|o| o.value).collect::<Vec<_>>(),
    });

    let mut spec = ChartSpec::new(vec![trace], "Outlying case counts", "", "Cases");
    spec.layout["shapes"] = json!([
        { "type": "line", "y0": payload.upper_fence, "y1": payload.upper_fence, "x0": 0, "x1": 1, "xref": "paper" },
        { "type": "line", "y0": payload.lower_fence, "y1": payload.lower_fence, "x0": 0, "x1": 1, "xref": "paper" },
    ]);
    Ok(spec)
}

#[derive(Deserialize)]
struct SummaryPayload {
    fields: IndexMap<String, Option<FieldTotal>>,
}

#[derive(Deserialize)]
struct FieldTotal {
    total: f64,
}

fn summary_bars(result: &AnalysisResult) -> Result<ChartSpec> {
    let payload: SummaryPayload = serde_json::from_value(result.values.clone())?;
    let (names, totals): (Vec<&str>, Vec<Option<f64>>) = payload
        .fields
        .iter()
        .map(|(name, stats)| (name.as_str(), stats.as_ref().map(|s| s.total)))
        .unzip();

    let trace = json!({
        "type": "bar",
        "x": names,
        "y": totals,
    });
    Ok(ChartSpec::new(vec![trace], "Case totals by field", "", "Total"))
}

/// Registry of live charts keyed by chart element id.
///
/// Charts move through an explicit create → update → dispose lifecycle;
/// creating over an existing id or updating a missing one is refused, so
/// a stale dashboard panel cannot silently adopt another panel's chart.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: IndexMap<String, ChartSpec>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chart under a fresh id. Returns false if the id is
    /// already taken.
    pub fn create(&mut self, id: impl Into<String>, spec: ChartSpec) -> bool {
        let id = id.into();
        if self.charts.contains_key(&id) {
            return false;
        }
        self.charts.insert(id, spec);
        true
    }

    /// Replace an existing chart. Returns false if the id is unknown.
    pub fn update(&mut self, id: &str, spec: ChartSpec) -> bool {
        match self.charts.get_mut(id) {
            Some(slot) => {
                *slot = spec;
                true
            }
            None => false,
        }
    }

    /// Remove a chart, returning it if it existed.
    pub fn dispose(&mut self, id: &str) -> Option<ChartSpec> {
        self.charts.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.get(id)
    }

    /// Registered ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
