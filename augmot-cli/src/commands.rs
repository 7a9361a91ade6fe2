//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::setup::{TerminalPrompter, describe_method};
use anyhow::Context;
use augmot_core::{
    AffinityMatrix, AugmotConfig, Detection, EmbeddingStore, InitMode, MethodRegistry, Track,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Init { auto, results } => handle_init(auto, results.as_deref(), workspace),
        Commands::Methods => handle_methods(),
        Commands::Config { action } => handle_config(action, workspace),
        Commands::Fuse { frame, sequence } => handle_fuse(&frame, sequence.as_deref(), workspace),
    }
}

fn load_validated_config(workspace: &Path) -> anyhow::Result<AugmotConfig> {
    let config = augmot_core::config::load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn handle_init(auto: bool, results: Option<&Path>, workspace: &Path) -> anyhow::Result<()> {
    let config = load_validated_config(workspace)?;
    let registry = MethodRegistry::with_builtins();

    let method = if auto {
        augmot_core::init_augment(&registry, InitMode::Automatic, &config, &config.thresholds)?
    } else {
        let mut prompter = TerminalPrompter;
        augmot_core::init_augment(
            &registry,
            InitMode::Interactive(&mut prompter),
            &config,
            &config.thresholds,
        )?
    };

    let results_dir = match results {
        Some(dir) => dir.to_path_buf(),
        None if config.augmentation.results_dir.is_absolute() => {
            config.augmentation.results_dir.clone()
        }
        None => workspace.join(&config.augmentation.results_dir),
    };
    let path = method
        .save_augmentation_parameters(&results_dir)
        .with_context(|| format!("Failed to save parameters to {}", results_dir.display()))?;

    for line in describe_method(method.as_ref()) {
        println!("  {}", line);
    }
    println!("  Saved parameters to: {}", path.display());
    Ok(())
}

fn handle_methods() -> anyhow::Result<()> {
    let registry = MethodRegistry::with_builtins();
    println!("Registered augmentation methods:");
    for entry in registry.entries() {
        println!(
            "  {:<12} {:<20} {}",
            entry.identifier, entry.display_name, entry.description
        );
    }
    Ok(())
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = augmot_core::config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = augmot_core::config::to_toml(&AugmotConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = augmot_core::config::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Validate => {
            load_validated_config(workspace)?;
            println!("Configuration is valid.");
            Ok(())
        }
    }
}

/// Input of `augmot fuse`.
#[derive(Debug, Deserialize)]
pub(crate) struct FrameInput {
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Rows are detections, columns are tracks.
    pub affinity: Vec<Vec<f64>>,
}

/// Output of `augmot fuse`.
#[derive(Debug, Serialize)]
pub(crate) struct FrameOutput {
    pub method: Option<String>,
    pub affinity: Vec<Vec<f64>>,
    pub stats: augmot_core::FusionStats,
}

/// Read a frame, augment its affinity, and return the result.
pub(crate) fn fuse_frame(
    mut frame: FrameInput,
    config: &AugmotConfig,
    sequence: Option<&str>,
) -> anyhow::Result<FrameOutput> {
    let registry = MethodRegistry::with_builtins();
    let method =
        augmot_core::init_augment(&registry, InitMode::Automatic, config, &config.thresholds)?;

    if let (Some(sequence), Some(folder)) = (sequence, method.folder()) {
        let store = EmbeddingStore::load(folder, sequence)?;
        let attached = store.attach(&mut frame.detections);
        tracing::info!(sequence, attached, "Attached embeddings");
    }

    let affinity = if frame.affinity.is_empty() {
        AffinityMatrix::new(0, frame.tracks.len(), 0.0)
    } else {
        AffinityMatrix::from_rows(frame.affinity)?
    };
    let (fused, stats) = augmot_core::augment_affinity_with_stats(
        method.as_ref(),
        &affinity,
        &frame.detections,
        &frame.tracks,
    )?;

    Ok(FrameOutput {
        method: method.name().map(str::to_string),
        affinity: fused.to_rows(),
        stats,
    })
}

fn handle_fuse(frame_path: &Path, sequence: Option<&str>, workspace: &Path) -> anyhow::Result<()> {
    let config = load_validated_config(workspace)?;
    let content = std::fs::read_to_string(frame_path)
        .with_context(|| format!("Failed to read frame file {}", frame_path.display()))?;
    let frame: FrameInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid frame file {}", frame_path.display()))?;

    let output = fuse_frame(frame, &config, sequence)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
