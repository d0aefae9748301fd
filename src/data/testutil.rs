//! Test fixtures shared by the data-layer unit tests.

use crate::data::bundle::{ArtifactBundle, FeatureMatrix, FEATURE_COUNT};
use crate::error::InferenceError;
use crate::inference::transform::{Imputer, StandardScaler};
use crate::inference::Regressor;

/// Stub model returning the same value for every sample.
pub(crate) struct FixedModel(pub f64);

impl Regressor for FixedModel {
    fn infer(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != FEATURE_COUNT {
            return Err(InferenceError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                got: features.len(),
            });
        }
        Ok(self.0)
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn describe(&self) -> String {
        format!("fixed stub ({})", self.0)
    }
}

/// Stub model whose inference always fails.
pub(crate) struct FailingModel;

impl Regressor for FailingModel {
    fn infer(&self, _features: &[f64]) -> Result<f64, InferenceError> {
        Err(InferenceError::NodeOutOfBounds {
            tree: 0,
            node: 7,
            len: 3,
        })
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn describe(&self) -> String {
        "failing stub".to_string()
    }
}

pub(crate) fn feature_names() -> Vec<String> {
    let bone = (0..241).map(|i| format!("bone_{i:03}"));
    let air = (0..143).map(|i| format!("air_{i:03}"));
    bone.chain(air).collect()
}

/// Bundle with one row per label; each row stores its bin position as the
/// feature value so segment tests can check positions against values.
pub(crate) fn bundle_with(model: Box<dyn Regressor>, labels: Vec<f64>) -> ArtifactBundle {
    let rows = labels.len();
    let data: Vec<f64> = (0..rows)
        .flat_map(|_| (0..FEATURE_COUNT).map(|j| j as f64))
        .collect();

    ArtifactBundle {
        model,
        scaler: StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        },
        imputer: Imputer {
            strategy: "mean".to_string(),
            statistics: vec![0.0; FEATURE_COUNT],
        },
        feature_names: feature_names(),
        features: FeatureMatrix::from_rows(rows, FEATURE_COUNT, data).expect("fixture shape"),
        labels,
    }
}

pub(crate) fn bundle_with_labels(labels: Vec<f64>) -> ArtifactBundle {
    bundle_with(Box::new(FixedModel(0.0)), labels)
}
