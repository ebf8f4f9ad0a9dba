//! Serve command - start the HTTP API server.

use std::path::PathBuf;

use colored::Colorize;
use mantoux::Engine;
use tracing_subscriber::EnvFilter;

use crate::server::{app, state::AppState};

pub fn run(
    cache: PathBuf,
    url: Option<String>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let loader = super::loader_for(cache.clone(), url);
    let engine = Engine::from_loader(loader)?;

    let dataset = engine.dataset();
    println!();
    println!(
        "{} {}",
        "Starting API server at".cyan().bold(),
        format!("http://localhost:{}", port).white().bold()
    );
    println!();
    println!("  Cache: {}", cache.display());
    println!("  Records: {}", dataset.len());
    if let Some((first, last)) = dataset.year_bounds() {
        println!("  Years: {}-{}", first, last);
    }
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let state = AppState::new(engine);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tokio::spawn(async {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            std::process::exit(0);
        });

        if let Err(e) = app::run_server(state, port).await {
            eprintln!("Server error: {}", e);
        }
    });

    Ok(())
}
