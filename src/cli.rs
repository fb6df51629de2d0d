// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Strategy-driven rollouts with health gating and failure analysis")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deckhand.yml configuration file
    Init {
        /// Application name
        #[arg(long)]
        app: Option<String>,

        /// Container image
        #[arg(long)]
        image: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration and show the deployment plan
    Check {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Classify a failure message and print remediation
    Classify {
        /// Error text to classify
        message: String,

        /// Pipeline stage the failure occurred in
        #[arg(short, long, default_value = "apply_manifest")]
        stage: String,
    },

    /// Analyze a captured health check result
    Analyze {
        /// JSON file holding a health check result
        file: PathBuf,
    },
}
