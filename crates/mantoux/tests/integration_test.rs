//! Integration tests for mantoux.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use mantoux::{
    export, validate, AnalysisKind, DataLoader, Engine, IssueKind, LoaderConfig, MantouxError,
    Scope,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn loader_for(file: &NamedTempFile) -> DataLoader {
    DataLoader::with_config(LoaderConfig {
        cache_path: file.path().to_path_buf(),
        url: None,
        timeout: Duration::from_secs(5),
    })
}

const SMALL: &str = "country,region,year,population,new_cases,mdr_cases,xdr_cases\n\
    India,SEA,2017,1338658835,1000000,9000,600\n\
    India,SEA,2018,1352617328,1100000,9800,650\n\
    India,SEA,2019,1366417754,1210000,10100,700\n\
    Nigeria,AFR,2017,190873311,400000,2000,100\n\
    Nigeria,AFR,2018,195874740,440000,2100,110\n\
    Nigeria,AFR,2019,200963599,484000,2250,120\n";

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_from_cache_file() {
    let file = create_test_file(SMALL);
    let dataset = loader_for(&file).load().expect("load failed");

    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.countries(), vec!["India", "Nigeria"]);
    assert_eq!(dataset.year_bounds(), Some((2017, 2019)));
}

#[test]
fn test_load_missing_cache_without_url_fails() {
    let loader = DataLoader::with_config(LoaderConfig {
        cache_path: "does/not/exist.csv".into(),
        url: None,
        timeout: Duration::from_secs(1),
    });
    assert!(loader.load().is_err());
}

#[test]
fn test_malformed_cache_fails_with_data_load_error() {
    let file = create_test_file("not,a,surveillance\nfile,at,all\n");
    let err = loader_for(&file).load().unwrap_err();
    assert!(matches!(err, MantouxError::DataLoad(_)));
}

// =============================================================================
// End-to-end analyses
// =============================================================================

#[test]
fn test_every_analysis_kind_runs_on_the_full_dataset() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    for kind in AnalysisKind::all() {
        let result = engine
            .run(kind, &Scope::all())
            .unwrap_or_else(|e| panic!("{} failed: {}", kind, e));
        assert_eq!(result.metric, kind);
        assert!(!result.values.is_null());
    }
}

#[test]
fn test_incidence_matches_hand_computation() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    let scope = Scope::all().with_country("Nigeria").with_years(2017, 2017);
    let result = engine.run(AnalysisKind::Incidence, &scope).unwrap();

    let series = result.values["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    let rate = series[0]["rate"].as_f64().unwrap();
    let expected = 400000.0 / 190873311.0 * 100000.0;
    assert!((rate - expected).abs() < 1e-9);
}

#[test]
fn test_scope_with_no_records_is_insufficient_data() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    let scope = Scope::all().with_country("Wakanda");
    let err = engine.run(AnalysisKind::Incidence, &scope).unwrap_err();
    assert!(matches!(err, MantouxError::InsufficientData { .. }));
}

#[test]
fn test_unknown_analysis_kind_fails_before_touching_data() {
    let err = "sentiment".parse::<AnalysisKind>().unwrap_err();
    assert!(matches!(err, MantouxError::UnsupportedAnalysis(_)));
}

#[test]
fn test_cache_is_invalidated_by_refresh() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    let first = engine.run(AnalysisKind::SummaryStats, &Scope::all()).unwrap();
    assert_eq!(engine.cached_results(), 1);

    engine.refresh().expect("refresh");
    assert_eq!(engine.cached_results(), 0);

    let second = engine.run(AnalysisKind::SummaryStats, &Scope::all()).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    // Identical data, so identical values.
    assert_eq!(first.values, second.values);
}

// =============================================================================
// Refresh atomicity
// =============================================================================

#[test]
fn test_concurrent_reads_never_see_a_mixed_dataset() {
    // Dataset A is all-India, dataset B is all-Nigeria. Readers racing a
    // refresh must observe one or the other, never a blend.
    let all_india: String = format!(
        "country,year,new_cases\n{}",
        (2000..2020)
            .map(|y| format!("India,{},1000\n", y))
            .collect::<String>()
    );
    let all_nigeria: String = format!(
        "country,year,new_cases\n{}",
        (2000..2020)
            .map(|y| format!("Nigeria,{},2000\n", y))
            .collect::<String>()
    );

    let file = create_test_file(&all_india);
    let engine = Arc::new(Engine::from_loader(loader_for(&file)).expect("engine"));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = engine.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = engine.dataset();
                let countries = snapshot.countries();
                assert_eq!(
                    countries.len(),
                    1,
                    "snapshot mixed countries: {:?}",
                    countries
                );
            }
        }));
    }

    // Writer: alternate the cache file contents and refresh.
    for i in 0..20 {
        let contents = if i % 2 == 0 { &all_nigeria } else { &all_india };
        std::fs::write(file.path(), contents).expect("rewrite cache");
        engine.refresh().expect("refresh");
    }

    for handle in handles {
        handle.join().expect("reader panicked");
    }
}

#[test]
fn test_failed_refresh_keeps_serving_previous_dataset() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    // Clobber the cache file so the next reload is malformed.
    std::fs::write(file.path(), "garbage").expect("rewrite cache");

    assert!(engine.refresh().is_err());
    // Previous dataset still answers queries.
    let result = engine.run(AnalysisKind::SummaryStats, &Scope::all()).unwrap();
    assert_eq!(result.values["fields"]["new_cases"]["count"], 6);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_flags_inverted_resistance_counts() {
    let content = "country,year,new_cases,mdr_cases,xdr_cases\n\
        India,2018,100,10,50\n\
        India,2018,100,10,1\n";
    let file = create_test_file(content);
    let dataset = loader_for(&file).load().expect("load");

    let issues = validate(&dataset);
    assert!(issues.iter().any(|i| i.kind == IssueKind::XdrExceedsMdr));
    assert!(issues.iter().any(|i| i.kind == IssueKind::DuplicateKey));
}

// =============================================================================
// CSV export round trip
// =============================================================================

#[test]
fn test_dataset_export_round_trip() {
    let file = create_test_file(SMALL);
    let dataset = loader_for(&file).load().expect("load");

    let csv_text = export::dataset_to_csv(&dataset).expect("export");
    let reloaded = DataLoader::new()
        .parse_bytes(csv_text.as_bytes(), "round-trip")
        .expect("reload");

    assert_eq!(dataset.records, reloaded.records);
}

#[test]
fn test_analysis_export_preserves_numeric_values() {
    let file = create_test_file(SMALL);
    let engine = Engine::from_loader(loader_for(&file)).expect("engine");

    let result = engine.run(AnalysisKind::Incidence, &Scope::all()).unwrap();
    let csv_text = export::result_to_csv(&result).expect("export");

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let rate_col = headers.iter().position(|h| h == "rate").expect("rate col");

    let series = result.values["series"].as_array().unwrap();
    for (row, point) in reader.records().zip(series) {
        let row = row.unwrap();
        let exported: f64 = row[rate_col].parse().unwrap();
        let original = point["rate"].as_f64().unwrap();
        assert_eq!(exported, original);
    }
}
