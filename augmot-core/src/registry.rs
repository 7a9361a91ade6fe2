//! Registry of augmentation methods, keyed by identifier.
//!
//! Dispatch is resolved once at start-up; unknown identifiers fail with
//! [`AugmentError::UnknownMethod`].

use crate::config::VisualSimilarityConfig;
use crate::error::{AugmentError, Result};
use crate::method::AugmentationMethod;
use crate::methods::VisualSimilarity2D;
use crate::methods::visual_similarity::{VISUAL_SIMILARITY_ID, VISUAL_SIMILARITY_NAME};
use crate::types::{BiasRatio, ClassThresholds};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Settings shared by every method: what the setup step resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSettings {
    pub name: String,
    pub folder: PathBuf,
    pub bias_ratio: BiasRatio,
}

/// Builds a method from resolved settings.
pub type MethodConstructor = fn(
    MethodSettings,
    &VisualSimilarityConfig,
    &ClassThresholds,
) -> Result<Box<dyn AugmentationMethod>>;

/// A registered method.
#[derive(Clone)]
pub struct MethodEntry {
    pub identifier: String,
    pub display_name: String,
    pub description: String,
    pub constructor: MethodConstructor,
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Maps identifiers to method constructors.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    entries: HashMap<String, MethodEntry>,
}

impl MethodRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in method.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.entries.insert(
            VISUAL_SIMILARITY_ID.to_string(),
            MethodEntry {
                identifier: VISUAL_SIMILARITY_ID.to_string(),
                display_name: VISUAL_SIMILARITY_NAME.to_string(),
                description: "Minimum embedding distance between a detection and a track's recent 2D appearance history".to_string(),
                constructor: build_visual_similarity,
            },
        );
        registry
    }

    /// Register a method. Identifiers must be unique.
    pub fn register(&mut self, entry: MethodEntry) -> Result<()> {
        if self.entries.contains_key(&entry.identifier) {
            return Err(AugmentError::DuplicateMethod {
                identifier: entry.identifier,
            });
        }
        tracing::debug!(identifier = %entry.identifier, "Registered augmentation method");
        self.entries.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&MethodEntry> {
        self.entries.get(identifier)
    }

    /// All entries, sorted by identifier.
    pub fn entries(&self) -> Vec<&MethodEntry> {
        let mut entries: Vec<&MethodEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        entries
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries()
            .into_iter()
            .map(|e| e.identifier.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the method registered under `identifier`.
    pub fn create(
        &self,
        identifier: &str,
        settings: MethodSettings,
        config: &VisualSimilarityConfig,
        thresholds: &ClassThresholds,
    ) -> Result<Box<dyn AugmentationMethod>> {
        let entry = self
            .get(identifier)
            .ok_or_else(|| AugmentError::unknown_method(identifier))?;
        tracing::info!(
            identifier,
            name = %settings.name,
            folder = %settings.folder.display(),
            bias_ratio = settings.bias_ratio.value(),
            "Creating augmentation method"
        );
        (entry.constructor)(settings, config, thresholds)
    }
}

fn build_visual_similarity(
    settings: MethodSettings,
    config: &VisualSimilarityConfig,
    thresholds: &ClassThresholds,
) -> Result<Box<dyn AugmentationMethod>> {
    Ok(Box::new(VisualSimilarity2D::new(settings, config, thresholds)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::DoNotAugment;

    fn settings() -> MethodSettings {
        MethodSettings {
            name: "VisualSimilarity2D".into(),
            folder: PathBuf::from("/tmp/emb"),
            bias_ratio: BiasRatio::new(0.4).unwrap(),
        }
    }

    fn build_noop(
        _: MethodSettings,
        _: &VisualSimilarityConfig,
        thresholds: &ClassThresholds,
    ) -> Result<Box<dyn AugmentationMethod>> {
        Ok(Box::new(DoNotAugment::new(thresholds)))
    }

    #[test]
    fn test_builtins() {
        let registry = MethodRegistry::with_builtins();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert_eq!(registry.identifiers(), vec!["vis_sim_2d"]);
        assert_eq!(
            registry.get("vis_sim_2d").unwrap().display_name,
            "VisualSimilarity2D"
        );
    }

    #[test]
    fn test_create_vis_sim_2d() {
        let registry = MethodRegistry::with_builtins();
        let thresholds = ClassThresholds::from([("car".to_string(), 0.5)]);
        let method = registry
            .create(
                "vis_sim_2d",
                settings(),
                &VisualSimilarityConfig::default(),
                &thresholds,
            )
            .unwrap();
        assert_eq!(method.identifier(), "vis_sim_2d");
        assert_eq!(method.bias_ratio().value(), 0.4);
        assert_eq!(method.map_ratio("car"), Some(0.5));
    }

    #[test]
    fn test_create_unknown_method() {
        let registry = MethodRegistry::with_builtins();
        let result = registry.create(
            "vis_sim_3d",
            settings(),
            &VisualSimilarityConfig::default(),
            &ClassThresholds::new(),
        );
        assert!(matches!(
            result,
            Err(AugmentError::UnknownMethod { identifier }) if identifier == "vis_sim_3d"
        ));
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = MethodRegistry::with_builtins();
        let entry = MethodEntry {
            identifier: "vis_sim_2d".into(),
            display_name: "Other".into(),
            description: String::new(),
            constructor: build_noop,
        };
        assert!(matches!(
            registry.register(entry),
            Err(AugmentError::DuplicateMethod { .. })
        ));
    }

    #[test]
    fn test_register_custom_and_sorted_listing() {
        let mut registry = MethodRegistry::with_builtins();
        registry
            .register(MethodEntry {
                identifier: "appearance_lidar".into(),
                display_name: "AppearanceLidar".into(),
                description: "test".into(),
                constructor: build_noop,
            })
            .unwrap();
        assert_eq!(registry.identifiers(), vec!["appearance_lidar", "vis_sim_2d"]);
        let method = registry
            .create(
                "appearance_lidar",
                settings(),
                &VisualSimilarityConfig::default(),
                &ClassThresholds::new(),
            )
            .unwrap();
        assert!(!method.is_active());
    }
}
