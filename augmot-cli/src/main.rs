//! augmot CLI: setup and fusion front end for tracker affinity augmentation.
//!
//! Provides interactive or config-driven method setup, registry listing,
//! config inspection, and single-frame affinity fusion.

mod commands;
pub(crate) mod setup;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// augmot: feature-based affinity augmentation for multi-object trackers
#[derive(Parser, Debug)]
#[command(name = "augmot", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Choose an augmentation method and save its parameters for this run
    Init {
        /// Use the configured method without prompting
        #[arg(long)]
        auto: bool,
        /// Directory for the parameter file (defaults to the configured results dir)
        #[arg(short, long)]
        results: Option<PathBuf>,
    },
    /// List registered augmentation methods
    Methods,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Blend augmented scores into one frame's affinity matrix
    Fuse {
        /// JSON file with `detections`, `tracks`, and `affinity`
        #[arg(short, long)]
        frame: PathBuf,
        /// Attach embeddings from `<folder>/<sequence>.json` before fusing
        #[arg(short, long)]
        sequence: Option<String>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the resolved configuration
    Show,
    /// Check the resolved configuration for invalid values
    Validate,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "augmot", "augmot")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "augmot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace)
}
