//! The no-op method used when augmentation is declined or disabled.

use crate::error::Result;
use crate::method::{AugmentationMethod, write_params_file};
use crate::types::{
    AugmentScore, BiasRatio, ClassRatios, ClassThresholds, Detection, FeatureVector, Features,
    Track,
};
use std::path::{Path, PathBuf};

pub const DO_NOT_AUGMENT_ID: &str = "none";
pub const NO_AUGMENTATION_FILE: &str = "No_augmentation_used.json";

/// Leaves every affinity untouched.
#[derive(Debug, Clone)]
pub struct DoNotAugment {
    map_ratio: ClassRatios,
}

impl DoNotAugment {
    pub fn new(thresholds: &ClassThresholds) -> Self {
        let mut method = Self {
            map_ratio: ClassRatios::new(),
        };
        method.map_ratio = method.setup_map_ratio(thresholds);
        method
    }
}

impl AugmentationMethod for DoNotAugment {
    fn name(&self) -> Option<&str> {
        None
    }

    fn identifier(&self) -> &str {
        DO_NOT_AUGMENT_ID
    }

    fn folder(&self) -> Option<&Path> {
        None
    }

    fn bias_ratio(&self) -> BiasRatio {
        BiasRatio::TRACKER_ONLY
    }

    fn map_ratios(&self) -> &ClassRatios {
        &self.map_ratio
    }

    fn setup_map_ratio(&self, thresholds: &ClassThresholds) -> ClassRatios {
        thresholds.clone()
    }

    fn get_features(&self, detections: &[Detection], tracks: &[Track]) -> Result<Features> {
        Ok(Features {
            detections: vec![None; detections.len()],
            tracks: vec![Vec::new(); tracks.len()],
        })
    }

    fn evaluate_score(&self, _: Option<&FeatureVector>, _: &[FeatureVector]) -> AugmentScore {
        AugmentScore::Skip
    }

    fn save_augmentation_parameters(&self, save_dir: &Path) -> Result<PathBuf> {
        let path = save_dir.join(NO_AUGMENTATION_FILE);
        write_params_file(&path, &serde_json::json!({ "None": null }))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ClassThresholds {
        ClassThresholds::from([("car".to_string(), 0.7), ("pedestrian".to_string(), 0.9)])
    }

    #[test]
    fn test_identity_accessors() {
        let method = DoNotAugment::new(&thresholds());
        assert_eq!(method.name(), None);
        assert!(!method.is_active());
        assert_eq!(method.identifier(), "none");
        assert!(method.folder().is_none());
        assert_eq!(method.bias_ratio().value(), 1.0);
    }

    #[test]
    fn test_map_ratio_is_thresholds() {
        let method = DoNotAugment::new(&thresholds());
        assert_eq!(method.map_ratios(), &thresholds());
        assert_eq!(method.map_ratio("car"), Some(0.7));
        assert_eq!(method.map_ratio("cyclist"), None);
    }

    #[test]
    fn test_features_are_aligned_and_empty() {
        let method = DoNotAugment::new(&thresholds());
        let dets = vec![
            Detection::new(1, 0, "car").with_feature(vec![1.0, 0.0]),
            Detection::new(2, 0, "car"),
        ];
        let tracks = vec![Track::new(10, "car")];
        let features = method.get_features(&dets, &tracks).unwrap();
        assert_eq!(features.detections, vec![None, None]);
        assert_eq!(features.tracks.len(), 1);
        assert!(features.tracks[0].is_empty());
    }

    #[test]
    fn test_score_is_skip() {
        let method = DoNotAugment::new(&thresholds());
        let f = FeatureVector::new(vec![1.0]);
        assert_eq!(
            method.evaluate_score(Some(&f), std::slice::from_ref(&f)),
            AugmentScore::Skip
        );
    }

    #[test]
    fn test_save_parameters_writes_none_marker() {
        let dir = tempfile::tempdir().unwrap();
        let method = DoNotAugment::new(&thresholds());
        let path = method.save_augmentation_parameters(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("No_augmentation_used.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"None\": null\n}");
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, serde_json::json!({ "None": null }));
    }
}
