//! CLI subcommand implementations.

pub mod analyze;
pub mod export;
pub mod fetch;
pub mod serve;
pub mod validate;

use std::path::PathBuf;
use std::time::Duration;

use mantoux::{DataLoader, LoaderConfig, Scope};

/// Bound on remote fetches started from the CLI.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Loader for a cache file, optionally backed by a remote source.
pub fn loader_for(cache: PathBuf, url: Option<String>) -> DataLoader {
    DataLoader::with_config(LoaderConfig {
        cache_path: cache,
        url,
        timeout: FETCH_TIMEOUT,
    })
}

/// Build a scope from the common --country/--from/--to arguments.
pub fn scope_from_args(
    country: Option<String>,
    from: Option<i32>,
    to: Option<i32>,
) -> Result<Scope, String> {
    let mut scope = Scope::all();
    if let Some(country) = country {
        scope = scope.with_country(country);
    }
    if from.is_some() || to.is_some() {
        let from = from.unwrap_or(i32::MIN);
        let to = to.unwrap_or(i32::MAX);
        if from > to {
            return Err(format!("invalid year range: {} > {}", from, to));
        }
        scope = scope.with_years(from, to);
    }
    Ok(scope)
}
