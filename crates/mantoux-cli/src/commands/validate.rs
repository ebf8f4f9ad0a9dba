//! Validate command - report data-quality findings.

use std::path::PathBuf;

use colored::Colorize;
use mantoux::{validate, Severity};

pub fn run(cache: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let loader = super::loader_for(cache, None);
    let dataset = loader.load_cache()?;

    let issues = validate(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    println!(
        "{} {} records from {}",
        "Validated".cyan().bold(),
        dataset.len().to_string().white().bold(),
        dataset.meta.source
    );

    if issues.is_empty() {
        println!("{}", "No issues found - data looks clean!".green());
        return Ok(());
    }

    let error_count = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warning_count = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .count();
    let info_count = issues.iter().filter(|i| i.severity == Severity::Info).count();

    println!(
        "Found {} findings ({} errors, {} warnings, {} info)",
        issues.len().to_string().white().bold(),
        error_count.to_string().red(),
        warning_count.to_string().yellow(),
        info_count.to_string().blue()
    );
    println!();

    for issue in &issues {
        let severity = match issue.severity {
            Severity::Error => issue.severity.label().red().bold(),
            Severity::Warning => issue.severity.label().yellow().bold(),
            Severity::Info => issue.severity.label().blue(),
        };
        println!("  [{}] {}: {}", severity, issue.kind.label(), issue.description);
        if verbose && !issue.rows.is_empty() {
            println!("         rows: {:?}", issue.rows);
        }
    }
    Ok(())
}
