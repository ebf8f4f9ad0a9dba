//! Example: Run every analysis against a surveillance CSV.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path>
//!
//! Example:
//!   cargo run --example analyze -- data/tb_surveillance.csv

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use mantoux::{validate, AnalysisKind, DataLoader, Engine, LoaderConfig, Scope};

fn main() -> mantoux::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example analyze -- <file_path>");
        std::process::exit(1);
    }

    let loader = DataLoader::with_config(LoaderConfig {
        cache_path: PathBuf::from(&args[1]),
        url: None,
        timeout: Duration::from_secs(30),
    });
    let engine = Engine::from_loader(loader)?;

    let dataset = engine.dataset();
    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Mantoux Analysis: {}", dataset.meta.source);
    println!("{}", separator);
    println!();
    println!("## Dataset");
    println!("  Records: {}", dataset.len());
    println!("  Countries: {}", dataset.countries().len());
    if let Some((first, last)) = dataset.year_bounds() {
        println!("  Years: {}-{}", first, last);
    }
    println!();

    let issues = validate(&dataset);
    println!("## Data quality ({} findings)", issues.len());
    for issue in &issues {
        println!("  [{}] {}", issue.severity.label(), issue.description);
    }
    println!();

    for kind in AnalysisKind::all() {
        println!("## {}", kind);
        match engine.run(kind, &Scope::all()) {
            Ok(result) => println!("{}", serde_json::to_string_pretty(&result.values)?),
            Err(e) => println!("  skipped: {}", e),
        }
        println!();
    }

    Ok(())
}
