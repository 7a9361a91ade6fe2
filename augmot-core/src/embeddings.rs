//! Extended detection results: per-detection feature vectors produced by an
//! external re-identification method and read from the method's folder.
//!
//! One file per sequence, `<folder>/<sequence>.json`, mapping frame number to
//! the embeddings found in that frame:
//!
//! ```json
//! { "0": [ { "detection_id": 4, "feature": [0.1, 0.7, 0.2] } ] }
//! ```

use crate::error::{ConfigError, Result};
use crate::types::{Detection, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// One embedding entry in a results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub detection_id: u64,
    pub feature: FeatureVector,
}

/// Embeddings of one sequence, indexed by frame and detection id.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingStore {
    frames: BTreeMap<u32, HashMap<u64, FeatureVector>>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the results file for `sequence` inside `folder`.
    pub fn sequence_path(folder: &Path, sequence: &str) -> PathBuf {
        folder.join(format!("{}.json", sequence))
    }

    /// Load `<folder>/<sequence>.json`.
    pub fn load(folder: &Path, sequence: &str) -> Result<Self> {
        let path = Self::sequence_path(folder, sequence);
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path }.into());
        }
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            frames = store.frame_count(),
            embeddings = store.len(),
            "Loaded extended detection results"
        );
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<EmbeddingRecord>> = serde_json::from_str(content)?;
        let mut store = Self::new();
        for (frame, records) in raw {
            let frame: u32 = frame.parse().map_err(|_| ConfigError::ParseError {
                message: format!("frame key '{}' is not a number", frame),
            })?;
            for record in records {
                store.insert(frame, record.detection_id, record.feature);
            }
        }
        Ok(store)
    }

    pub fn insert(&mut self, frame: u32, detection_id: u64, feature: FeatureVector) {
        self.frames
            .entry(frame)
            .or_default()
            .insert(detection_id, feature);
    }

    pub fn feature(&self, frame: u32, detection_id: u64) -> Option<&FeatureVector> {
        self.frames.get(&frame)?.get(&detection_id)
    }

    /// Fill in each detection's feature from the store; returns how many were found.
    ///
    /// Detections without a stored embedding keep whatever feature they had.
    pub fn attach(&self, detections: &mut [Detection]) -> usize {
        let mut attached = 0;
        for det in detections.iter_mut() {
            if let Some(feature) = self.feature(det.frame, det.id) {
                det.feature = Some(feature.clone());
                attached += 1;
            }
        }
        attached
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total number of embeddings across frames.
    pub fn len(&self) -> usize {
        self.frames.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
