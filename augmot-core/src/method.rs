//! The augmentation capability interface.
//!
//! An augmentation method supplies a feature-based score for every
//! detection/track pair. The score is blended into the tracker's affinity
//! matrix by [`crate::fusion`], weighted by the method's bias ratio and the
//! per-class map ratio.

use crate::error::Result;
use crate::types::{
    AugmentScore, BiasRatio, ClassRatios, ClassThresholds, Detection, FeatureVector, Features,
    Track,
};
use std::path::{Path, PathBuf};

/// Behaviour every augmentation method must provide.
///
/// Implementations must return well-formed values from every call: feature
/// sequences aligned with their inputs and scores in `[0, 1]` or
/// [`AugmentScore::Skip`].
pub trait AugmentationMethod: Send + Sync {
    /// Display name, or `None` when no augmentation is performed.
    fn name(&self) -> Option<&str>;

    /// Registry identifier (e.g. `"vis_sim_2d"`).
    fn identifier(&self) -> &str;

    /// Folder holding the extended detection results, if the method reads any.
    fn folder(&self) -> Option<&Path>;

    fn bias_ratio(&self) -> BiasRatio;

    fn map_ratios(&self) -> &ClassRatios;

    fn map_ratio(&self, class_label: &str) -> Option<f64> {
        self.map_ratios().get(class_label).copied()
    }

    /// Derive the per-class map ratio from the tracker's class thresholds.
    fn setup_map_ratio(&self, thresholds: &ClassThresholds) -> ClassRatios;

    /// Features for each detection and each track, in input order.
    fn get_features(&self, detections: &[Detection], tracks: &[Track]) -> Result<Features>;

    /// Score one detection feature against one track's feature history.
    fn evaluate_score(
        &self,
        detection: Option<&FeatureVector>,
        track: &[FeatureVector],
    ) -> AugmentScore;

    /// Write the chosen parameters as JSON into `save_dir`; returns the file path.
    fn save_augmentation_parameters(&self, save_dir: &Path) -> Result<PathBuf>;

    fn is_active(&self) -> bool {
        self.name().is_some()
    }
}

/// Write `value` as 4-space indented JSON, atomically.
pub(crate) fn write_params_file(path: &Path, value: &serde_json::Value) -> Result<()> {
    use serde::Serialize;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &buf)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    tracing::info!(path = %path.display(), "Saved augmentation parameters");
    Ok(())
}
