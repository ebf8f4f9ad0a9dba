//! Fetch command - download the surveillance CSV into the cache.

use std::path::PathBuf;

use colored::Colorize;

pub fn run(
    cache: PathBuf,
    url: String,
    force: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if cache.exists() && !force {
        println!(
            "{} {} already exists; use {} to re-download",
            "Note:".yellow(),
            cache.display(),
            "--force".cyan()
        );
        return Ok(());
    }

    println!("{} {}", "Fetching".cyan().bold(), url.white());

    let loader = super::loader_for(cache.clone(), Some(url));
    let dataset = loader.fetch_remote()?;

    if verbose {
        if let Some((first, last)) = dataset.year_bounds() {
            println!("  Years: {}-{}", first, last);
        }
        println!("  Countries: {}", dataset.countries().len());
        println!("  Hash: {}", dataset.meta.hash);
    }

    println!(
        "{} {} records to {}",
        "Cached".green().bold(),
        dataset.len().to_string().white().bold(),
        cache.display()
    );
    Ok(())
}
