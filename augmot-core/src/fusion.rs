//! Blending augmented scores into the tracker's affinity matrix.
//!
//! For each detection/track pair with a non-skip score `s`:
//!
//! ```text
//! fused = bias * original + (1 - bias) * s * map_ratio[class of detection]
//! ```
//!
//! A bias of 1 keeps the tracker's affinity, a bias of 0 uses only the
//! augmented score rescaled into the tracker's per-class cost units.

use crate::error::{AugmentError, Result};
use crate::method::AugmentationMethod;
use crate::types::{AugmentScore, Detection, Track};
use serde::Serialize;

/// Dense row-major matrix: rows are detections, columns are tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffinityMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl AffinityMatrix {
    pub fn new(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(AugmentError::ShapeMismatch {
                    expected_rows: n_rows,
                    expected_cols: cols,
                    rows: n_rows,
                    cols: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Returns false when the index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            true
        } else {
            false
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|r| self.data[r * self.cols..(r + 1) * self.cols].to_vec())
            .collect()
    }
}

/// Pair counts from one fusion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FusionStats {
    pub pairs: usize,
    pub augmented: usize,
    pub skipped: usize,
}

/// Blend `method`'s scores into `affinity`; see the module docs for the formula.
pub fn augment_affinity(
    method: &dyn AugmentationMethod,
    affinity: &AffinityMatrix,
    detections: &[Detection],
    tracks: &[Track],
) -> Result<AffinityMatrix> {
    augment_affinity_with_stats(method, affinity, detections, tracks).map(|(m, _)| m)
}

/// Like [`augment_affinity`], also returning how many pairs were changed.
pub fn augment_affinity_with_stats(
    method: &dyn AugmentationMethod,
    affinity: &AffinityMatrix,
    detections: &[Detection],
    tracks: &[Track],
) -> Result<(AffinityMatrix, FusionStats)> {
    if affinity.rows() != detections.len() || affinity.cols() != tracks.len() {
        return Err(AugmentError::ShapeMismatch {
            expected_rows: detections.len(),
            expected_cols: tracks.len(),
            rows: affinity.rows(),
            cols: affinity.cols(),
        });
    }

    let mut stats = FusionStats {
        pairs: detections.len() * tracks.len(),
        ..Default::default()
    };
    if !method.is_active() {
        stats.skipped = stats.pairs;
        return Ok((affinity.clone(), stats));
    }

    let features = method.get_features(detections, tracks)?;
    if features.detections.len() != detections.len() {
        return Err(AugmentError::FeatureCountMismatch {
            kind: "detection",
            expected: detections.len(),
            actual: features.detections.len(),
        });
    }
    if features.tracks.len() != tracks.len() {
        return Err(AugmentError::FeatureCountMismatch {
            kind: "track",
            expected: tracks.len(),
            actual: features.tracks.len(),
        });
    }

    let bias = method.bias_ratio().value();
    let mut fused = affinity.clone();
    for (row, detection) in detections.iter().enumerate() {
        let det_feature = features.detections[row].as_ref();
        // Only rows with at least one scored pair need a ratio.
        let mut ratio: Option<f64> = None;
        for (col, track_features) in features.tracks.iter().enumerate() {
            let score = match method.evaluate_score(det_feature, track_features) {
                AugmentScore::Skip => {
                    stats.skipped += 1;
                    continue;
                }
                AugmentScore::Distance(d) => AugmentScore::from_raw(d)?.as_f64(),
            };
            let map_ratio = match ratio {
                Some(r) => r,
                None => {
                    let r = method.map_ratio(&detection.class_label).ok_or_else(|| {
                        AugmentError::MissingClassRatio {
                            class: detection.class_label.clone(),
                        }
                    })?;
                    ratio = Some(r);
                    r
                }
            };
            let original = affinity.data[row * affinity.cols + col];
            fused.data[row * fused.cols + col] =
                bias * original + (1.0 - bias) * score * map_ratio;
            stats.augmented += 1;
        }
    }

    tracing::debug!(
        method = method.identifier(),
        pairs = stats.pairs,
        augmented = stats.augmented,
        skipped = stats.skipped,
        "Fused augmented affinity"
    );
    Ok((fused, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualSimilarityConfig;
    use crate::methods::{DoNotAugment, VisualSimilarity2D};
    use crate::registry::MethodSettings;
    use crate::types::{BiasRatio, ClassThresholds, FeatureVector};
    use std::path::PathBuf;

    fn vis_sim(bias: f64, thresholds: &ClassThresholds) -> VisualSimilarity2D {
        VisualSimilarity2D::new(
            MethodSettings {
                name: "VisualSimilarity2D".into(),
                folder: PathBuf::from("/tmp"),
                bias_ratio: BiasRatio::new(bias).unwrap(),
            },
            &VisualSimilarityConfig::default(),
            thresholds,
        )
    }

    fn scene() -> (Vec<Detection>, Vec<Track>) {
        let dets = vec![
            Detection::new(1, 0, "car").with_feature(vec![1.0, 0.0]),
            Detection::new(2, 0, "car"),
        ];
        let mut t0 = Track::new(10, "car");
        t0.features.push(FeatureVector::new(vec![1.0, 0.0]));
        let mut t1 = Track::new(11, "car");
        t1.features.push(FeatureVector::new(vec![-1.0, 0.0]));
        (dets, vec![t0, t1])
    }

    #[test]
    fn test_matrix_from_rows() {
        let m = AffinityMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(0), Some(&[1.0, 2.0][..]));
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!(AffinityMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_matrix_set() {
        let mut m = AffinityMatrix::new(1, 2, 0.0);
        assert!(m.set(0, 1, 5.0));
        assert!(!m.set(1, 0, 5.0));
        assert_eq!(m.get(0, 1), Some(5.0));
    }

    #[test]
    fn test_fusion_blends_scores() {
        let thresholds = ClassThresholds::from([("car".to_string(), 2.0)]);
        let method = vis_sim(0.5, &thresholds);
        let (dets, tracks) = scene();
        let affinity = AffinityMatrix::new(2, 2, 1.0);

        let (fused, stats) =
            augment_affinity_with_stats(&method, &affinity, &dets, &tracks).unwrap();
        // Perfect match: 0.5 * 1.0 + 0.5 * 0.0 * 2.0
        assert_eq!(fused.get(0, 0), Some(0.5));
        // Opposite: 0.5 * 1.0 + 0.5 * 1.0 * 2.0
        assert_eq!(fused.get(0, 1), Some(1.5));
        // Detection without a feature is skipped
        assert_eq!(fused.row(1), Some(&[1.0, 1.0][..]));
        assert_eq!(
            stats,
            FusionStats {
                pairs: 4,
                augmented: 2,
                skipped: 2
            }
        );
    }

    #[test]
    fn test_fusion_bias_one_keeps_original() {
        let thresholds = ClassThresholds::from([("car".to_string(), 2.0)]);
        let method = vis_sim(1.0, &thresholds);
        let (dets, tracks) = scene();
        let affinity = AffinityMatrix::from_rows(vec![vec![0.3, 0.7], vec![0.2, 0.9]]).unwrap();
        let fused = augment_affinity(&method, &affinity, &dets, &tracks).unwrap();
        assert_eq!(fused, affinity);
    }

    #[test]
    fn test_fusion_inactive_method_is_identity() {
        let method = DoNotAugment::new(&ClassThresholds::new());
        let (dets, tracks) = scene();
        let affinity = AffinityMatrix::new(2, 2, 0.4);
        let (fused, stats) =
            augment_affinity_with_stats(&method, &affinity, &dets, &tracks).unwrap();
        assert_eq!(fused, affinity);
        assert_eq!(stats.skipped, 4);
        assert_eq!(stats.augmented, 0);
    }

    #[test]
    fn test_fusion_shape_mismatch() {
        let method = DoNotAugment::new(&ClassThresholds::new());
        let (dets, tracks) = scene();
        let affinity = AffinityMatrix::new(3, 2, 0.0);
        assert!(matches!(
            augment_affinity(&method, &affinity, &dets, &tracks),
            Err(AugmentError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_fusion_missing_class_ratio() {
        let method = vis_sim(0.5, &ClassThresholds::new());
        let (dets, tracks) = scene();
        let affinity = AffinityMatrix::new(2, 2, 0.0);
        assert!(matches!(
            augment_affinity(&method, &affinity, &dets, &tracks),
            Err(AugmentError::MissingClassRatio { class }) if class == "car"
        ));
    }
}
