/// Inference layer: the model capability and its concrete implementations.
///
/// Architecture:
/// ```text
///   model.json
///       │ serde
///       ▼
///  ┌───────────────┐
///  │ ModelArtifact  │  tagged enum, one variant per model family
///  └───────────────┘
///       │ into_regressor()
///       ▼
///  ┌───────────────────┐
///  │ Box<dyn Regressor> │  infer(&[f64; 384]) -> f64
///  └───────────────────┘
/// ```
///
/// The scaler and imputer artifacts live in [`transform`]. They are loaded
/// and validated alongside the model but are not applied on the inference
/// path: the held-out features arrive pre-transformed from the training
/// pipeline.
pub mod gbdt;
pub mod linear;
pub mod transform;

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use gbdt::GbdtRegressor;
use linear::LinearRegressor;

// ---------------------------------------------------------------------------
// Regressor – the one-method inference capability
// ---------------------------------------------------------------------------

/// A trained regression model: a feature vector in, one scalar out.
///
/// Inference is deterministic and side-effect-free; the same input always
/// yields the same output, so callers never retry a failed call.
pub trait Regressor: Send + Sync {
    /// Predict the axial position for one feature vector.
    fn infer(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Short human-readable description for the UI.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// ModelArtifact – the on-disk schema of model.json
// ---------------------------------------------------------------------------

/// Serialized form of a trained model, dispatched on the `kind` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    GbdtRegressor(GbdtRegressor),
    LinearRegressor(LinearRegressor),
}

impl ModelArtifact {
    /// Structural validation run once at load time. Returns a reason
    /// string so the loader can wrap it as a corrupt-artifact error.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::GbdtRegressor(m) => m.validate(),
            ModelArtifact::LinearRegressor(m) => m.validate(),
        }
    }

    /// Unwrap into the runtime capability.
    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelArtifact::GbdtRegressor(m) => Box::new(m),
            ModelArtifact::LinearRegressor(m) => Box::new(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_json_dispatches_on_kind() {
        let json = r#"{
            "kind": "linear_regressor",
            "intercept": 1.5,
            "weights": [2.0, 0.0]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).expect("parse");
        artifact.validate().expect("valid");
        let model = artifact.into_regressor();
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.infer(&[3.0, 9.0]).unwrap(), 7.5);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{ "kind": "support_vector_machine" }"#;
        assert!(serde_json::from_str::<ModelArtifact>(json).is_err());
    }
}
