//! Value types shared by augmentation methods, the registry, and fusion.

use crate::error::{AugmentError, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-class thresholds supplied by the tracker, keyed by class label.
pub type ClassThresholds = BTreeMap<String, f64>;

/// Per-class blend ratios ("map ratio"), keyed by class label.
pub type ClassRatios = BTreeMap<String, f64>;

/// Weight between the tracker's own affinity and the augmented score.
///
/// `1.0` keeps the tracker's affinity only, `0.0` uses the augmented score only.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BiasRatio(f64);

impl BiasRatio {
    /// Keep the tracker's affinity untouched.
    pub const TRACKER_ONLY: BiasRatio = BiasRatio(1.0);

    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidBiasRatio { value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for BiasRatio {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        BiasRatio::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for BiasRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A re-identification embedding attached to a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn l2_norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Unit-length copy, or `None` for a zero (or non-finite) vector.
    pub fn normalized(&self) -> Option<FeatureVector> {
        let norm = self.l2_norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        Some(Self(self.0.iter().map(|v| v / norm).collect()))
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// A single detection in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: u64,
    #[serde(default)]
    pub frame: u32,
    pub class_label: String,
    /// 2D box as `[x1, y1, x2, y2]` in image coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureVector>,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(id: u64, frame: u32, class_label: impl Into<String>) -> Self {
        Self {
            id,
            frame,
            class_label: class_label.into(),
            bbox: None,
            confidence: default_confidence(),
            feature: None,
        }
    }

    pub fn with_feature(mut self, values: Vec<f32>) -> Self {
        self.feature = Some(FeatureVector::new(values));
        self
    }

    pub fn with_bbox(mut self, bbox: [f32; 4]) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// A maintained trajectory with the features of every detection it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub class_label: String,
    /// Oldest first.
    #[serde(default)]
    pub features: Vec<FeatureVector>,
}

impl Track {
    pub fn new(id: u64, class_label: impl Into<String>) -> Self {
        Self {
            id,
            class_label: class_label.into(),
            features: Vec::new(),
        }
    }

    /// Record a matched detection, keeping at most `budget` features.
    pub fn record_match(&mut self, detection: &Detection, budget: usize) {
        if let Some(feature) = &detection.feature {
            self.features.push(feature.clone());
        }
        if self.features.len() > budget {
            let excess = self.features.len() - budget;
            self.features.drain(..excess);
        }
    }

    /// The newest `n` features, oldest first.
    pub fn recent_features(&self, n: usize) -> &[FeatureVector] {
        let start = self.features.len().saturating_sub(n);
        &self.features[start..]
    }
}

/// Outcome of comparing one detection with one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AugmentScore {
    /// Leave the tracker's original affinity for this pair unchanged.
    Skip,
    /// Distance in `[0, 1]`: 0 is a perfect match, 1 means no similarity.
    Distance(f64),
}

impl AugmentScore {
    /// Wire value of [`AugmentScore::Skip`].
    pub const SKIP_VALUE: f64 = -1.0;

    /// Accepts exactly `-1` or a value in `[0, 1]`.
    pub fn from_raw(value: f64) -> Result<Self, AugmentError> {
        if value == Self::SKIP_VALUE {
            Ok(Self::Skip)
        } else if (0.0..=1.0).contains(&value) {
            Ok(Self::Distance(value))
        } else {
            Err(AugmentError::InvalidScore { value })
        }
    }

    /// Clamp a computed distance into `[0, 1]`; NaN becomes `Skip`.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::Skip
        } else {
            Self::Distance(value.clamp(0.0, 1.0))
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Skip => Self::SKIP_VALUE,
            Self::Distance(d) => d,
        }
    }

    pub fn is_skip(self) -> bool {
        matches!(self, Self::Skip)
    }
}

/// Features retrieved for one association step, aligned with the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    pub detections: Vec<Option<FeatureVector>>,
    pub tracks: Vec<Vec<FeatureVector>>,
}
