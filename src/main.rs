// ABOUTME: Entry point for the deckhand CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use deckhand::config;
use deckhand::error::Result;
use deckhand::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli.command, mode) {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(command: Commands, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    let cwd = env::current_dir()?;

    match command {
        Commands::Init { app, image, force } => {
            config::init_config(&cwd, app.as_deref(), image.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Check { destination } => {
            commands::check(&cwd, destination.as_deref(), output)
        }
        Commands::Classify { message, stage } => commands::classify(&message, &stage, output),
        Commands::Analyze { file } => commands::analyze(&file, &cwd, output),
    }
}
