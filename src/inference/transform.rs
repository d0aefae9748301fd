use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Preprocessing artifacts
// ---------------------------------------------------------------------------
//
// Both transforms ship with the bundle and are validated against the
// feature arity, but the inference path feeds stored features to the model
// untouched: the held-out split is saved post-transform by the training
// pipeline. `apply` exists for callers that start from raw readings.

/// Column-wise standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(format!(
                "scaler covers {} means / {} scales, expected {n_features}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(i) = self.scale.iter().position(|s| *s == 0.0) {
            return Err(format!("scale for feature {i} is zero"));
        }
        Ok(())
    }

    #[allow(dead_code)] // not on the inference path; see module note
    pub fn apply(&self, features: &mut [f64]) {
        for ((x, mean), scale) in features.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - mean) / scale;
        }
    }

    pub fn describe(&self) -> String {
        format!("Standard scaler over {} features", self.mean.len())
    }
}

/// Fills missing readings with a per-column statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    /// Name of the statistic the values were derived from ("mean", ...).
    pub strategy: String,
    pub statistics: Vec<f64>,
}

impl Imputer {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.statistics.len() != n_features {
            return Err(format!(
                "imputer covers {} features, expected {n_features}",
                self.statistics.len()
            ));
        }
        Ok(())
    }

    #[allow(dead_code)] // not on the inference path; see module note
    pub fn apply(&self, features: &mut [f64]) {
        for (x, fill) in features.iter_mut().zip(&self.statistics) {
            if x.is_nan() {
                *x = *fill;
            }
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} imputer over {} features",
            self.strategy,
            self.statistics.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaler_standardizes_in_place() {
        let scaler = StandardScaler {
            mean: vec![1.0, 10.0],
            scale: vec![2.0, 5.0],
        };
        let mut x = vec![3.0, 0.0];
        scaler.apply(&mut x);
        assert_eq!(x, vec![1.0, -2.0]);
    }

    #[test]
    fn scaler_rejects_zero_scale() {
        let scaler = StandardScaler {
            mean: vec![0.0],
            scale: vec![0.0],
        };
        assert!(scaler.validate(1).is_err());
    }

    #[test]
    fn scaler_rejects_wrong_length() {
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(scaler.validate(4).is_err());
    }

    #[test]
    fn imputer_fills_only_missing_values() {
        let imputer = Imputer {
            strategy: "mean".to_string(),
            statistics: vec![0.5, 0.25],
        };
        let mut x = vec![f64::NAN, 9.0];
        imputer.apply(&mut x);
        assert_eq!(x, vec![0.5, 9.0]);
    }
}
