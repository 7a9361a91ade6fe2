//! # augmot Core
//!
//! Core library for augmenting a multi-object tracker's affinity computation
//! with auxiliary feature-based similarity scores.
//! Provides the augmentation method interface and its built-in variants,
//! the method registry, configuration and setup validation, loading of
//! extended detection results, and affinity fusion.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod fusion;
pub mod init;
pub mod method;
pub mod methods;
pub mod registry;
pub mod types;
pub mod validate;

// Re-export commonly used types at the crate root.
pub use config::{AugmotConfig, FeatureMetric, load_config};
pub use embeddings::EmbeddingStore;
pub use error::{AugmentError, ConfigError, Result};
pub use fusion::{AffinityMatrix, FusionStats, augment_affinity, augment_affinity_with_stats};
pub use init::{InitMode, SetupPrompter, init_augment};
pub use method::AugmentationMethod;
pub use methods::{DoNotAugment, VisualSimilarity2D};
pub use registry::{MethodEntry, MethodRegistry, MethodSettings};
pub use types::{
    AugmentScore, BiasRatio, ClassRatios, ClassThresholds, Detection, FeatureVector, Features,
    Track,
};
