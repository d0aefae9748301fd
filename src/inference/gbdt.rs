use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::error::InferenceError;

// ---------------------------------------------------------------------------
// Gradient-boosted tree ensemble
// ---------------------------------------------------------------------------

/// One node of a flattened decision tree.
///
/// A tree is a `Vec<Node>` walked from index 0; split children always sit
/// strictly after their parent, which rules out cycles and bounds every
/// walk by the table length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Where NaN inputs go. LightGBM-style missing-value routing.
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk the tree for one feature vector. The caller has already
    /// checked the vector length against the model arity.
    fn output(&self, tree_idx: usize, features: &[f64]) -> Result<f64, InferenceError> {
        let mut cursor = 0usize;
        loop {
            let node = self.nodes.get(cursor).ok_or(InferenceError::NodeOutOfBounds {
                tree: tree_idx,
                node: cursor,
                len: self.nodes.len(),
            })?;
            match *node {
                Node::Leaf { value } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[feature];
                    cursor = if x.is_nan() {
                        if default_left { left } else { right }
                    } else if x <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree_idx} has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features {
                    return Err(format!(
                        "tree {tree_idx} node {i} splits on feature {feature}, model arity is {n_features}"
                    ));
                }
                if left >= self.nodes.len() || right >= self.nodes.len() {
                    return Err(format!(
                        "tree {tree_idx} node {i} points past the {}-node table",
                        self.nodes.len()
                    ));
                }
                // Children must come after the parent so walks terminate.
                if left <= i || right <= i {
                    return Err(format!(
                        "tree {tree_idx} node {i} has a child at or before itself"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A boosted ensemble of regression trees: `base_score` plus the sum of
/// every tree's leaf output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtRegressor {
    pub n_features: usize,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl GbdtRegressor {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("model arity is zero".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features)?;
        }
        Ok(())
    }
}

impl Regressor for GbdtRegressor {
    fn infer(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::FeatureCountMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }
        let mut score = self.base_score;
        for (i, tree) in self.trees.iter().enumerate() {
            score += tree.output(i, features)?;
        }
        Ok(score)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn describe(&self) -> String {
        format!(
            "Gradient-boosted trees ({} trees, base score {:.2})",
            self.trees.len(),
            self.base_score
        )
    }
}
