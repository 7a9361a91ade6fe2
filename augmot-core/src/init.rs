//! Initialising an augmentation method, either from config or interactively.
//!
//! Interactive setup walks the user through:
//! 1. Whether to augment at all
//! 2. Which registered method to use
//! 3. Where the method's results are saved (default folder or a custom path)
//! 4. The bias ratio between the tracker and the augmented score

use crate::config::AugmotConfig;
use crate::error::{AugmentError, ConfigError, Result};
use crate::method::AugmentationMethod;
use crate::methods::DoNotAugment;
use crate::registry::{MethodRegistry, MethodSettings};
use crate::types::{BiasRatio, ClassThresholds};
use crate::validate::{
    accepts_default_folder, is_affirmative, parse_bias_ratio, validate_folder,
    validate_method_name, validate_thresholds,
};
use std::path::PathBuf;

/// Source of answers during interactive setup.
pub trait SetupPrompter {
    /// Read one line of free text.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Pick one of `items`; returns its index.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Show an informational or retry message.
    fn notify(&mut self, message: &str);
}

/// How [`init_augment`] obtains its settings.
pub enum InitMode<'a> {
    /// Use the loaded configuration as-is.
    Automatic,
    /// Ask the user, using config values only as defaults.
    Interactive(&'a mut dyn SetupPrompter),
}

/// Create the augmentation method for this run.
pub fn init_augment(
    registry: &MethodRegistry,
    mode: InitMode<'_>,
    config: &AugmotConfig,
    thresholds: &ClassThresholds,
) -> Result<Box<dyn AugmentationMethod>> {
    validate_thresholds(thresholds)?;
    match mode {
        InitMode::Automatic => init_automatic(registry, config, thresholds),
        InitMode::Interactive(prompter) => {
            init_interactive(registry, prompter, config, thresholds)
        }
    }
}

fn init_automatic(
    registry: &MethodRegistry,
    config: &AugmotConfig,
    thresholds: &ClassThresholds,
) -> Result<Box<dyn AugmentationMethod>> {
    let aug = &config.augmentation;
    if !aug.enabled {
        tracing::info!("Augmentation disabled in configuration");
        return Ok(Box::new(DoNotAugment::new(thresholds)));
    }

    let entry = registry
        .get(&aug.method)
        .ok_or_else(|| AugmentError::unknown_method(&aug.method))?;
    let name = aug
        .name
        .clone()
        .unwrap_or_else(|| entry.display_name.clone());
    validate_method_name(&name)?;
    let folder = validate_folder(&aug.resolve_folder(&name))?;
    let bias_ratio = BiasRatio::new(aug.bias_ratio)?;

    registry.create(
        &aug.method,
        MethodSettings {
            name,
            folder,
            bias_ratio,
        },
        &config.visual_similarity,
        thresholds,
    )
}

fn init_interactive(
    registry: &MethodRegistry,
    prompter: &mut dyn SetupPrompter,
    config: &AugmotConfig,
    thresholds: &ClassThresholds,
) -> Result<Box<dyn AugmentationMethod>> {
    let answer = prompter.input(
        "Would you like to augment the tracker by concatenating its affinity matrix \
         with one based on data from another method? [y/n]",
    )?;
    if !is_affirmative(&answer) {
        tracing::info!("Augmentation declined");
        return Ok(Box::new(DoNotAugment::new(thresholds)));
    }

    let entries = registry.entries();
    if entries.is_empty() {
        return Err(AugmentError::Config(ConfigError::MissingField {
            field: "registered augmentation methods".into(),
        }));
    }
    let items: Vec<String> = entries
        .iter()
        .map(|e| format!("{} ({})", e.display_name, e.identifier))
        .collect();
    let choice = prompter.select("Select an augmentation method", &items)?;
    let entry = entries
        .get(choice)
        .ok_or_else(|| AugmentError::prompt(format!("selection {} out of range", choice)))?;

    let name = entry.display_name.clone();
    validate_method_name(&name)?;
    let folder = prompt_source_folder(prompter, &config.augmentation.mount_path, &name)?;
    let bias_ratio = prompt_bias_ratio(prompter, &name)?;

    registry.create(
        &entry.identifier,
        MethodSettings {
            name,
            folder,
            bias_ratio,
        },
        &config.visual_similarity,
        thresholds,
    )
}

/// Ask for the results folder, retrying until a path that exists is given.
pub fn prompt_source_folder(
    prompter: &mut dyn SetupPrompter,
    mount_path: &std::path::Path,
    name: &str,
) -> Result<PathBuf> {
    let default = crate::config::default_folder(mount_path, name);
    prompter.notify(&format!("The default folder is {}", default.display()));
    let answer = prompter.input("Are your results saved in the default folder? [y/n]")?;
    if accepts_default_folder(&answer) {
        return Ok(default);
    }

    prompter.notify("Please write the path to your saved results.");
    loop {
        let typed = prompter.input(&format!("{}/", mount_path.display()))?;
        match validate_folder(&mount_path.join(typed.trim())) {
            Ok(folder) => return Ok(folder),
            Err(_) => prompter.notify("Error: folder does not exist. Input again"),
        }
    }
}

/// Ask for the bias ratio, retrying on non-numbers and out-of-range values.
pub fn prompt_bias_ratio(prompter: &mut dyn SetupPrompter, name: &str) -> Result<BiasRatio> {
    prompter.notify(&format!(
        "Insert bias ratio in the range [0, 1]:\n{}",
        bias_ratio_banner(name)
    ));
    loop {
        let typed = prompter.input("Bias ratio")?;
        match parse_bias_ratio(&typed) {
            Ok(bias) => return Ok(bias),
            Err(ConfigError::ParseError { .. }) => prompter.notify("Please print a number."),
            Err(_) => prompter.notify("Bias ratio outside of permitted range"),
        }
    }
}

/// The two-ended scale shown above the bias prompt.
pub fn bias_ratio_banner(name: &str) -> String {
    let padding = 25usize.saturating_sub(name.chars().count());
    format!(
        " Tracker{}{}\n 1 ----------------------------- 0",
        " ".repeat(padding),
        name
    )
}
