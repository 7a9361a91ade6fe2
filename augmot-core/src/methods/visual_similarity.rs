//! 2D visual similarity: compares re-identification embeddings of detections
//! against the embedding history of each track.

use crate::config::{FeatureMetric, VisualSimilarityConfig};
use crate::error::Result;
use crate::method::{AugmentationMethod, write_params_file};
use crate::registry::MethodSettings;
use crate::types::{
    AugmentScore, BiasRatio, ClassRatios, ClassThresholds, Detection, FeatureVector, Features,
    Track,
};
use std::path::{Path, PathBuf};

pub const VISUAL_SIMILARITY_ID: &str = "vis_sim_2d";
pub const VISUAL_SIMILARITY_NAME: &str = "VisualSimilarity2D";

/// Scores pairs by the smallest embedding distance over a track's recent history.
#[derive(Debug, Clone)]
pub struct VisualSimilarity2D {
    name: String,
    folder: PathBuf,
    bias_ratio: BiasRatio,
    metric: FeatureMetric,
    history_len: usize,
    map_scale: f64,
    map_ratio: ClassRatios,
}

impl VisualSimilarity2D {
    pub fn new(
        settings: MethodSettings,
        config: &VisualSimilarityConfig,
        thresholds: &ClassThresholds,
    ) -> Self {
        let mut method = Self {
            name: settings.name,
            folder: settings.folder,
            bias_ratio: settings.bias_ratio,
            metric: config.metric,
            history_len: config.history_len.max(1),
            map_scale: config.map_scale,
            map_ratio: ClassRatios::new(),
        };
        method.map_ratio = method.setup_map_ratio(thresholds);
        method
    }

    pub fn metric(&self) -> FeatureMetric {
        self.metric
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Distance in `[0, 1]` between two unit vectors.
    fn unit_distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        let (a, b) = (a.as_slice(), b.as_slice());
        match self.metric {
            FeatureMetric::Cosine => {
                let cos: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                (1.0 - f64::from(cos)) / 2.0
            }
            FeatureMetric::Euclidean => {
                let sq: f32 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                f64::from(sq.sqrt()) / 2.0
            }
        }
    }
}

impl AugmentationMethod for VisualSimilarity2D {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn identifier(&self) -> &str {
        VISUAL_SIMILARITY_ID
    }

    fn folder(&self) -> Option<&Path> {
        Some(&self.folder)
    }

    fn bias_ratio(&self) -> BiasRatio {
        self.bias_ratio
    }

    fn map_ratios(&self) -> &ClassRatios {
        &self.map_ratio
    }

    fn setup_map_ratio(&self, thresholds: &ClassThresholds) -> ClassRatios {
        thresholds
            .iter()
            .map(|(class, threshold)| (class.clone(), threshold * self.map_scale))
            .collect()
    }

    fn get_features(&self, detections: &[Detection], tracks: &[Track]) -> Result<Features> {
        Ok(Features {
            detections: detections.iter().map(|d| d.feature.clone()).collect(),
            tracks: tracks
                .iter()
                .map(|t| t.recent_features(self.history_len).to_vec())
                .collect(),
        })
    }

    fn evaluate_score(
        &self,
        detection: Option<&FeatureVector>,
        track: &[FeatureVector],
    ) -> AugmentScore {
        let Some(detection) = detection.and_then(FeatureVector::normalized) else {
            return AugmentScore::Skip;
        };

        let mut best: Option<f64> = None;
        for sample in track {
            if sample.dim() != detection.dim() {
                tracing::warn!(
                    detection_dim = detection.dim(),
                    track_dim = sample.dim(),
                    "Feature dimension mismatch, skipping pair"
                );
                return AugmentScore::Skip;
            }
            let Some(sample) = sample.normalized() else {
                return AugmentScore::Skip;
            };
            let d = self.unit_distance(&detection, &sample);
            best = Some(best.map_or(d, |b| b.min(d)));
        }

        match best {
            Some(d) => AugmentScore::clamped(d),
            None => AugmentScore::Skip,
        }
    }

    fn save_augmentation_parameters(&self, save_dir: &Path) -> Result<PathBuf> {
        let path = save_dir.join(format!("{}_augmentation_parameters.json", self.name));
        let params = serde_json::json!({
            "name": self.name,
            "identifier": VISUAL_SIMILARITY_ID,
            "folder": self.folder,
            "bias ratio": self.bias_ratio,
            "metric": self.metric,
            "history length": self.history_len,
            "map scale": self.map_scale,
            "map ratio": self.map_ratio,
        });
        write_params_file(&path, &params)?;
        Ok(path)
    }
}
