//! Dataset loading: cache file first, remote CSV source as fallback.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use crate::error::{MantouxError, Result};

use super::record::Record;
use super::table::{Dataset, DatasetMeta};

/// Aliases mapping raw WHO export headers onto canonical field names, so
/// both the cache file and an unprocessed WHO download load directly.
static COLUMN_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("country", "country"),
        ("g_whoregion", "region"),
        ("region", "region"),
        ("year", "year"),
        ("e_pop_num", "population"),
        ("population", "population"),
        ("pulm_labconf_new", "new_cases"),
        ("new_cases", "new_cases"),
        ("mdr_new", "mdr_cases"),
        ("mdr_cases", "mdr_cases"),
        ("xdr", "xdr_cases"),
        ("xdr_cases", "xdr_cases"),
    ])
});

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Flat cache file backing the dataset between restarts.
    pub cache_path: PathBuf,
    /// Remote CSV source (None = cache only).
    pub url: Option<String>,
    /// Bound on the remote fetch.
    pub timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("data/tb_surveillance.csv"),
            url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Loads datasets from the cache file or the remote source.
pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Cache-first load: read the cache file if present, otherwise fetch
    /// the remote source and populate the cache.
    pub fn load(&self) -> Result<Dataset> {
        if self.config.cache_path.exists() {
            self.load_cache()
        } else {
            self.fetch_remote()
        }
    }

    /// Reload ignoring the cache-first preference: fetch the remote
    /// source when one is configured, otherwise re-read the cache file.
    pub fn reload(&self) -> Result<Dataset> {
        if self.config.url.is_some() {
            self.fetch_remote()
        } else {
            self.load_cache()
        }
    }

    /// Read the cache file.
    pub fn load_cache(&self) -> Result<Dataset> {
        let path = &self.config.cache_path;
        let bytes = fs::read(path).map_err(|e| MantouxError::Io {
            path: path.clone(),
            source: e,
        })?;
        self.parse_bytes(&bytes, &path.display().to_string())
    }

    /// Fetch from the remote source and refresh the cache file. The
    /// request is bounded by the configured timeout; expiry surfaces as a
    /// data-load error without touching the cache.
    pub fn fetch_remote(&self) -> Result<Dataset> {
        let url = self.config.url.as_deref().ok_or_else(|| {
            MantouxError::DataLoad(
                "no remote source configured and no cache file present".to_string(),
            )
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| MantouxError::DataLoad(format!("HTTP client: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| MantouxError::DataLoad(format!("fetching {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(MantouxError::DataLoad(format!(
                "fetching {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| MantouxError::DataLoad(format!("reading body from {}: {}", url, e)))?;

        // Parse before writing, so a malformed download never clobbers a
        // good cache file.
        let dataset = self.parse_bytes(&bytes, url)?;
        self.write_cache(&bytes)?;
        Ok(dataset)
    }

    fn write_cache(&self, bytes: &[u8]) -> Result<()> {
        let path = &self.config.cache_path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| MantouxError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        fs::write(path, bytes).map_err(|e| MantouxError::Io {
            path: path.clone(),
            source: e,
        })
    }

    /// Parse CSV bytes into a dataset.
    pub fn parse_bytes(&self, bytes: &[u8], source: &str) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();

        // Map canonical field names to column positions. First alias wins
        // when a file carries both spellings.
        let mut positions: HashMap<&'static str, usize> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            let lowered = name.trim().to_ascii_lowercase();
            if let Some(&canonical) = COLUMN_ALIASES.get(lowered.as_str()) {
                positions.entry(canonical).or_insert(idx);
            }
        }
        for required in ["country", "year"] {
            if !positions.contains_key(required) {
                return Err(MantouxError::DataLoad(format!(
                    "missing required column '{}' in {}",
                    required, source
                )));
            }
        }

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let row = result?;
            let field = |name: &str| positions.get(name).and_then(|&i| row.get(i)).map(str::trim);

            let country = match field("country") {
                Some(c) if !is_null(c) => c.to_string(),
                _ => {
                    return Err(MantouxError::DataLoad(format!(
                        "row {}: missing country in {}",
                        row_idx + 2,
                        source
                    )));
                }
            };
            let year = field("year")
                .filter(|v| !is_null(v))
                .and_then(|v| v.parse::<i32>().ok())
                .ok_or_else(|| {
                    MantouxError::DataLoad(format!(
                        "row {}: missing or unparseable year in {}",
                        row_idx + 2,
                        source
                    ))
                })?;

            records.push(Record {
                country,
                region: field("region")
                    .filter(|v| !is_null(v))
                    .map(str::to_string),
                year,
                population: parse_opt_f64(field("population")),
                new_cases: parse_opt_count(field("new_cases")),
                mdr_cases: parse_opt_count(field("mdr_cases")),
                xdr_cases: parse_opt_count(field("xdr_cases")),
            });
        }

        if records.is_empty() {
            return Err(MantouxError::DataLoad(format!("no data rows in {}", source)));
        }

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let meta = DatasetMeta {
            source: source.to_string(),
            hash: format!("sha256:{:x}", hasher.finalize()),
            row_count: records.len(),
            loaded_at: Utc::now(),
        };

        Ok(Dataset::new(records, meta))
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Null markers seen in WHO exports.
fn is_null(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed == "."
}

fn parse_opt_f64(value: Option<&str>) -> Option<f64> {
    value
        .filter(|v| !is_null(v))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Counts sometimes arrive float-formatted ("123.0") after a round trip
/// through other tools; accept those, reject anything fractional or
/// negative.
fn parse_opt_count(value: Option<&str>) -> Option<u64> {
    let raw = value.filter(|v| !is_null(v))?;
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
        .map(|f| f as u64)
}
