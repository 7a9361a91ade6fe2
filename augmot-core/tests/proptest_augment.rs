//! Property-based tests for the augmentation contract using proptest.

use proptest::prelude::*;

use augmot_core::config::{FeatureMetric, VisualSimilarityConfig};
use augmot_core::validate::parse_bias_ratio;
use augmot_core::{
    AffinityMatrix, AugmentationMethod, BiasRatio, ClassThresholds, Detection, DoNotAugment,
    FeatureVector, MethodSettings, Track, VisualSimilarity2D, augment_affinity,
};
use std::path::PathBuf;

fn vis_sim(metric: FeatureMetric, bias: f64, history_len: usize) -> VisualSimilarity2D {
    VisualSimilarity2D::new(
        MethodSettings {
            name: "VisualSimilarity2D".into(),
            folder: PathBuf::from("/tmp"),
            bias_ratio: BiasRatio::new(bias).unwrap(),
        },
        &VisualSimilarityConfig {
            metric,
            history_len,
            map_scale: 1.0,
        },
        &ClassThresholds::from([("car".to_string(), 1.0)]),
    )
}

fn feature(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, dim)
}

fn metric() -> impl Strategy<Value = FeatureMetric> {
    prop_oneof![Just(FeatureMetric::Cosine), Just(FeatureMetric::Euclidean)]
}

// --- Score range properties ---

proptest! {
    #[test]
    fn score_is_in_unit_range_or_skip(
        metric in metric(),
        det in prop::option::of(feature(8)),
        history in prop::collection::vec(feature(8), 0..6),
    ) {
        let method = vis_sim(metric, 0.5, 4);
        let det = det.map(FeatureVector::new);
        let history: Vec<FeatureVector> = history.into_iter().map(FeatureVector::new).collect();
        let score = method.evaluate_score(det.as_ref(), &history).as_f64();
        prop_assert!(score == -1.0 || (0.0..=1.0).contains(&score), "score {}", score);
    }

    #[test]
    fn score_of_identical_features_is_near_zero(
        metric in metric(),
        values in feature(16),
    ) {
        let f = FeatureVector::new(values);
        prop_assume!(f.normalized().is_some());
        let method = vis_sim(metric, 0.5, 4);
        let score = method.evaluate_score(Some(&f), std::slice::from_ref(&f)).as_f64();
        prop_assert!((0.0..1e-3).contains(&score), "score {}", score);
    }

    #[test]
    fn noop_score_is_always_skip(
        det in prop::option::of(feature(4)),
        history in prop::collection::vec(feature(4), 0..4),
    ) {
        let method = DoNotAugment::new(&ClassThresholds::new());
        let det = det.map(FeatureVector::new);
        let history: Vec<FeatureVector> = history.into_iter().map(FeatureVector::new).collect();
        prop_assert_eq!(method.evaluate_score(det.as_ref(), &history).as_f64(), -1.0);
    }
}

// --- Feature alignment properties ---

proptest! {
    #[test]
    fn features_align_with_inputs(
        n_dets in 0usize..12,
        n_tracks in 0usize..12,
        history_len in 1usize..8,
    ) {
        let detections: Vec<Detection> = (0..n_dets)
            .map(|i| Detection::new(i as u64, 0, "car").with_feature(vec![i as f32, 1.0]))
            .collect();
        let tracks: Vec<Track> = (0..n_tracks).map(|i| Track::new(i as u64, "car")).collect();

        let methods: Vec<Box<dyn AugmentationMethod>> = vec![
            Box::new(vis_sim(FeatureMetric::Cosine, 0.5, history_len)),
            Box::new(DoNotAugment::new(&ClassThresholds::new())),
        ];
        for method in &methods {
            let features = method.get_features(&detections, &tracks).unwrap();
            prop_assert_eq!(features.detections.len(), n_dets);
            prop_assert_eq!(features.tracks.len(), n_tracks);
        }
    }

    #[test]
    fn track_history_never_exceeds_budget(
        budget in 1usize..10,
        matches in prop::collection::vec(feature(3), 0..30),
    ) {
        let mut track = Track::new(1, "car");
        for values in matches {
            track.record_match(&Detection::new(0, 0, "car").with_feature(values), budget);
            prop_assert!(track.features.len() <= budget);
        }
    }
}

// --- Bias ratio and fusion properties ---

proptest! {
    #[test]
    fn parsed_bias_ratio_is_in_range(value in -5.0f64..5.0) {
        match parse_bias_ratio(&value.to_string()) {
            Ok(bias) => prop_assert!((0.0..=1.0).contains(&bias.value())),
            Err(_) => prop_assert!(!(0.0..=1.0).contains(&value)),
        }
    }

    #[test]
    fn bias_one_leaves_affinity_unchanged(
        rows in prop::collection::vec(prop::collection::vec(0.0f64..10.0, 3), 1..5),
        det_values in feature(4),
        track_values in feature(4),
    ) {
        let n = rows.len();
        let affinity = AffinityMatrix::from_rows(rows).unwrap();
        let detections: Vec<Detection> = (0..n)
            .map(|i| Detection::new(i as u64, 0, "car").with_feature(det_values.clone()))
            .collect();
        let tracks: Vec<Track> = (0..3)
            .map(|i| {
                let mut t = Track::new(i, "car");
                t.features.push(FeatureVector::new(track_values.clone()));
                t
            })
            .collect();

        let method = vis_sim(FeatureMetric::Cosine, 1.0, 4);
        let fused = augment_affinity(&method, &affinity, &detections, &tracks).unwrap();
        prop_assert_eq!(fused, affinity);
    }
}
