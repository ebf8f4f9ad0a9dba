//! Export command - write the dataset or one analysis as CSV.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use mantoux::{export, AnalysisKind, Engine};

pub fn run(
    cache: PathBuf,
    kind: Option<String>,
    country: Option<String>,
    from: Option<i32>,
    to: Option<i32>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = super::scope_from_args(country, from, to)?;
    let loader = super::loader_for(cache, None);
    let engine = Engine::from_loader(loader)?;

    let (what, csv_text) = match kind {
        Some(kind) => {
            let kind: AnalysisKind = kind.parse()?;
            let result = engine.run(kind, &scope)?;
            (kind.to_string(), export::result_to_csv(&result)?)
        }
        None => {
            let dataset = engine.dataset().filter(&scope);
            if dataset.is_empty() {
                return Err(format!("no records match scope ({})", scope).into());
            }
            ("dataset".to_string(), export::dataset_to_csv(&dataset)?)
        }
    };

    match output {
        Some(path) => {
            fs::write(&path, &csv_text)?;
            if verbose {
                println!("  {} bytes", csv_text.len());
            }
            println!(
                "{} {} to {}",
                "Exported".green().bold(),
                what.white().bold(),
                path.display()
            );
        }
        None => print!("{}", csv_text),
    }
    Ok(())
}
