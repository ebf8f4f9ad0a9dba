//! Analyze command - run one analysis against the cached dataset.

use std::path::PathBuf;

use colored::Colorize;
use mantoux::{AnalysisKind, Engine};

pub fn run(
    kind: String,
    country: Option<String>,
    from: Option<i32>,
    to: Option<i32>,
    cache: PathBuf,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind: AnalysisKind = kind.parse()?;
    let scope = super::scope_from_args(country, from, to)?;

    let loader = super::loader_for(cache, None);
    let engine = Engine::from_loader(loader)?;

    if verbose {
        let dataset = engine.dataset();
        println!(
            "Loaded {} records from {}",
            dataset.len(),
            dataset.meta.source
        );
    }

    let result = engine.run(kind, &scope)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*result)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Analysis".cyan().bold(),
        kind.to_string().white().bold(),
        scope
    );
    println!("{}", serde_json::to_string_pretty(&result.values)?);
    Ok(())
}
