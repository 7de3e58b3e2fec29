//! workspace-layer CLI - build a deployable layer for one workspace package

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use workspace_layer::{ErrorKind, MaterializeError};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);

        let mut code = 1;
        if let Some(err) = e.downcast_ref::<MaterializeError>() {
            if let Some(help) = err.help() {
                eprintln!("help: {}", help);
            }
            if err.kind() == ErrorKind::Restoration {
                code = 2;
            }
        }
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("workspace_layer=debug")
    } else {
        EnvFilter::new("workspace_layer=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Package(args) => commands::package::execute(args),
        Commands::Config(args) => commands::config::execute(args),
    }
}
