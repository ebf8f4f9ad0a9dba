//! CSV export for datasets and analysis results.
//!
//! Output uses CRLF line endings to match what the dashboard's download
//! path always produced, but fields are properly quoted: the old
//! client-side exporter's unescaped commas were a bug, not a format.

use serde_json::Value;

use crate::analysis::AnalysisResult;
use crate::dataset::Dataset;
use crate::error::{MantouxError, Result};

/// Column order for dataset exports; matches the canonical cache header,
/// so an exported dataset loads back through the regular loader.
const DATASET_HEADER: [&str; 7] = [
    "country",
    "region",
    "year",
    "population",
    "new_cases",
    "mdr_cases",
    "xdr_cases",
];

/// Payload keys that hold the row array of a tabular analysis result.
const ROW_KEYS: [&str; 3] = ["series", "growth", "outliers"];

fn new_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| MantouxError::Internal(format!("flushing CSV buffer: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| MantouxError::Internal(format!("CSV buffer not UTF-8: {}", e)))
}

/// Serialize a dataset to CSV with the canonical header.
pub fn dataset_to_csv(dataset: &Dataset) -> Result<String> {
    let mut writer = new_writer();
    writer.write_record(DATASET_HEADER)?;

    for record in &dataset.records {
        writer.write_record([
            record.country.clone(),
            record.region.clone().unwrap_or_default(),
            record.year.to_string(),
            cell_opt(record.population),
            cell_opt(record.new_cases),
            cell_opt(record.mdr_cases),
            cell_opt(record.xdr_cases),
        ])?;
    }
    finish(writer)
}

/// Serialize an analysis result to CSV.
///
/// Tabular payloads (per-year series, growth points, flagged outliers)
/// become one row per entry; the summary payload becomes one row per
/// field; scalar payloads (CAGR) become a single row.
pub fn result_to_csv(result: &AnalysisResult) -> Result<String> {
    let rows = tabulate(&result.values);
    if rows.is_empty() {
        return Err(MantouxError::Internal(format!(
            "analysis payload for {} has no tabular content",
            result.metric
        )));
    }

    // Header from the first row; the engine emits homogeneous rows.
    let header: Vec<&str> = match rows[0].as_object() {
        Some(obj) => obj.keys().map(String::as_str).collect(),
        None => {
            return Err(MantouxError::Internal(
                "analysis payload rows are not objects".to_string(),
            ));
        }
    };

    let mut writer = new_writer();
    writer.write_record(&header)?;
    for row in &rows {
        let obj = row.as_object().ok_or_else(|| {
            MantouxError::Internal("analysis payload rows are not objects".to_string())
        })?;
        let cells: Vec<String> = header
            .iter()
            .map(|&key| obj.get(key).map(cell_value).unwrap_or_default())
            .collect();
        writer.write_record(&cells)?;
    }
    finish(writer)
}

/// Flatten an analysis payload into row objects.
fn tabulate(values: &Value) -> Vec<Value> {
    // Tabular payloads carry their rows under a known key.
    for key in ROW_KEYS {
        if let Some(rows) = values.get(key).and_then(Value::as_array) {
            if !rows.is_empty() {
                return rows.clone();
            }
        }
    }

    // Summary payload: one row per field.
    if let Some(fields) = values.get("fields").and_then(Value::as_object) {
        return fields
            .iter()
            .map(|(name, stats)| {
                let mut row = serde_json::Map::new();
                row.insert("field".to_string(), Value::String(name.clone()));
                if let Some(stats) = stats.as_object() {
                    for (key, value) in stats {
                        row.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(row)
            })
            .collect();
    }

    // Scalar payload: a single row of the top-level scalar entries.
    if let Some(obj) = values.as_object() {
        let mut row = serde_json::Map::new();
        for (key, value) in obj {
            if !value.is_array() && !value.is_object() {
                row.insert(key.clone(), value.clone());
            }
        }
        if !row.is_empty() {
            return vec![Value::Object(row)];
        }
    }
    Vec::new()
}

fn cell_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use crate::dataset::{DataLoader, Scope};
    use serde_json::json;

    fn dataset() -> Dataset {
        let data = b"country,region,year,population,new_cases,mdr_cases,xdr_cases\n\
            India,SEA,2018,1352617328,1194000,9800,650\n\
            \"Korea, Republic of\",WPR,2018,51606633,26433,580,\n";
        DataLoader::new().parse_bytes(data, "test").unwrap()
    }

    #[test]
    fn test_dataset_round_trip() {
        let original = dataset();
        let csv_text = dataset_to_csv(&original).unwrap();
        let reloaded = DataLoader::new()
            .parse_bytes(csv_text.as_bytes(), "round-trip")
            .unwrap();

        assert_eq!(original.records, reloaded.records);
    }

    #[test]
    fn test_embedded_comma_is_quoted() {
        let csv_text = dataset_to_csv(&dataset()).unwrap();
        assert!(csv_text.contains("\"Korea, Republic of\""));
    }

    #[test]
    fn test_crlf_line_endings() {
        let csv_text = dataset_to_csv(&dataset()).unwrap();
        assert!(csv_text.contains("\r\n"));
    }

    #[test]
    fn test_unknown_cells_export_empty() {
        let csv_text = dataset_to_csv(&dataset()).unwrap();
        let line = csv_text
            .lines()
            .find(|l| l.contains("Korea"))
            .expect("Korea row");
        assert!(line.ends_with(','));
    }

    #[test]
    fn test_series_result_to_csv() {
        let result = AnalysisResult::new(
            AnalysisKind::Incidence,
            Scope::all(),
            json!({
                "series": [
                    { "year": 2018, "cases": 100.0, "population": 1000000.0, "rate": 10.0 },
                    { "year": 2019, "cases": 150.0, "population": 1000000.0, "rate": 15.0 },
                ],
                "excluded_records": 0,
            }),
        );

        let csv_text = result_to_csv(&result).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("year,cases,population,rate"));
        assert_eq!(lines.next(), Some("2018,100.0,1000000.0,10.0"));
    }

    #[test]
    fn test_series_csv_round_trips_numbers() {
        let result = AnalysisResult::new(
            AnalysisKind::Incidence,
            Scope::all(),
            json!({
                "series": [{ "year": 2018, "rate": 12.345678901 }],
                "excluded_records": 0,
            }),
        );
        let csv_text = result_to_csv(&result).unwrap();

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row[0].parse::<i32>().unwrap(), 2018);
        assert_eq!(row[1].parse::<f64>().unwrap(), 12.345678901);
    }

    #[test]
    fn test_scalar_result_to_csv() {
        let result = AnalysisResult::new(
            AnalysisKind::Cagr,
            Scope::all(),
            json!({
                "field": "new_cases",
                "from_year": 2015,
                "to_year": 2019,
                "cagr_pct": 4.2,
            }),
        );
        let csv_text = result_to_csv(&result).unwrap();
        assert_eq!(csv_text.lines().count(), 2);
        assert!(csv_text.starts_with("field,from_year,to_year,cagr_pct"));
    }

    #[test]
    fn test_summary_result_to_csv() {
        let result = AnalysisResult::new(
            AnalysisKind::SummaryStats,
            Scope::all(),
            json!({
                "fields": {
                    "new_cases": { "count": 3, "total": 60.0, "mean": 20.0 },
                    "mdr_cases": null,
                }
            }),
        );
        let csv_text = result_to_csv(&result).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("field,count,total,mean"));
        assert_eq!(lines.next(), Some("new_cases,3,60.0,20.0"));
        // Field with no stats still gets its row.
        assert_eq!(lines.next(), Some("mdr_cases,,,"));
    }
}
