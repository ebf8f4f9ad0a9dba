//! Mantoux CLI - WHO TB surveillance analysis engine.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { cache, url, force } => commands::fetch::run(cache, url, force, cli.verbose),

        Commands::Analyze {
            kind,
            country,
            from,
            to,
            cache,
            json,
        } => commands::analyze::run(kind, country, from, to, cache, json, cli.verbose),

        Commands::Validate { cache, json } => commands::validate::run(cache, json, cli.verbose),

        Commands::Export {
            cache,
            kind,
            country,
            from,
            to,
            output,
        } => commands::export::run(cache, kind, country, from, to, output, cli.verbose),

        Commands::Serve { cache, url, port } => commands::serve::run(cache, url, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
