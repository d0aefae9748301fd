use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::error::InferenceError;

// ---------------------------------------------------------------------------
// Linear regressor
// ---------------------------------------------------------------------------

/// Plain linear model: `intercept + Σ wᵢ·xᵢ`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearRegressor {
    pub fn validate(&self) -> Result<(), String> {
        if self.weights.is_empty() {
            return Err("linear model has no weights".to_string());
        }
        Ok(())
    }
}

impl Regressor for LinearRegressor {
    fn infer(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.weights.len() {
            return Err(InferenceError::FeatureCountMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn describe(&self) -> String {
        format!("Linear model ({} weights)", self.weights.len())
    }
}
