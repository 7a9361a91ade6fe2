//! Configuration system for augmot.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from the user config directory and/or `.augmot/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{BiasRatio, ClassThresholds};
use crate::validate::{validate_method_name, validate_thresholds};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmotConfig {
    #[serde(default)]
    pub augmentation: AugmentationConfig,
    #[serde(default)]
    pub visual_similarity: VisualSimilarityConfig,
    /// Per-class association thresholds of the tracker.
    #[serde(default = "default_thresholds")]
    pub thresholds: ClassThresholds,
}

/// Which method to use and where its extended detection results live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentationConfig {
    /// When false, automatic setup yields the no-op method.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Registry identifier of the method.
    #[serde(default = "default_method")]
    pub method: String,
    /// Display name; falls back to the registry entry's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Root that default and user-typed folders are resolved against.
    #[serde(default = "default_mount_path")]
    pub mount_path: PathBuf,
    /// Explicit results folder; `<mount_path>/Embeddings/<name>/` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
    #[serde(default = "default_bias_ratio")]
    pub bias_ratio: f64,
    /// Where the per-run parameter file is written.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            method: default_method(),
            name: None,
            mount_path: default_mount_path(),
            folder: None,
            bias_ratio: default_bias_ratio(),
            results_dir: default_results_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "vis_sim_2d".to_string()
}

fn default_mount_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_bias_ratio() -> f64 {
    0.5
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_thresholds() -> ClassThresholds {
    ClassThresholds::new()
}

/// Distance used to compare appearance embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl fmt::Display for FeatureMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureMetric::Cosine => write!(f, "cosine"),
            FeatureMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Parameters of the 2D visual similarity method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualSimilarityConfig {
    #[serde(default)]
    pub metric: FeatureMetric,
    /// Newest track features compared against each detection.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Multiplier applied to each class threshold to get its map ratio.
    #[serde(default = "default_map_scale")]
    pub map_scale: f64,
}

impl Default for VisualSimilarityConfig {
    fn default() -> Self {
        Self {
            metric: FeatureMetric::default(),
            history_len: default_history_len(),
            map_scale: default_map_scale(),
        }
    }
}

fn default_history_len() -> usize {
    10
}

fn default_map_scale() -> f64 {
    1.0
}

impl AugmotConfig {
    /// Run the load-time checks: bias range, thresholds, and method parameters.
    ///
    /// Folder existence is checked when the folder is resolved, since the
    /// default folder depends on the chosen method.
    pub fn validate(&self) -> Result<(), ConfigError> {
        BiasRatio::new(self.augmentation.bias_ratio)?;

        if self.augmentation.method.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "augmentation.method".into(),
            });
        }

        if let Some(name) = &self.augmentation.name {
            validate_method_name(name)?;
        }

        validate_thresholds(&self.thresholds)?;

        if self.visual_similarity.history_len == 0 {
            return Err(ConfigError::InvalidField {
                field: "visual_similarity.history_len".into(),
                reason: "must be at least 1".into(),
            });
        }

        let scale = self.visual_similarity.map_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidField {
                field: "visual_similarity.map_scale".into(),
                reason: format!("{} is not a positive number", scale),
            });
        }

        Ok(())
    }
}

impl AugmentationConfig {
    /// The folder to read results from, given the method's display name.
    pub fn resolve_folder(&self, name: &str) -> PathBuf {
        match &self.folder {
            Some(folder) if folder.is_absolute() => folder.clone(),
            Some(folder) => self.mount_path.join(folder),
            None => default_folder(&self.mount_path, name),
        }
    }
}

/// `<mount_path>/Embeddings/<name>/`.
pub fn default_folder(mount_path: &Path, name: &str) -> PathBuf {
    mount_path.join("Embeddings").join(name)
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `AUGMOT_`)
/// 3. Workspace-local config (`.augmot/config.toml`)
/// 4. User config (`~/.config/augmot/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AugmotConfig>,
) -> Result<AugmotConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AugmotConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // AUGMOT_AUGMENTATION__BIAS_RATIO, AUGMOT_VISUAL_SIMILARITY__METRIC, etc.
    figment = figment.merge(Env::prefixed("AUGMOT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// `~/.config/augmot/config.toml` (platform dependent).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "augmot", "augmot")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// `<workspace>/.augmot/config.toml`.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".augmot").join("config.toml")
}

/// Render a config as TOML, e.g. for `augmot config show`.
pub fn to_toml(config: &AugmotConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}
