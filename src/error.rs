use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures while loading the artifact bundle at startup.
///
/// Both variants are fatal at startup: the app cannot serve any request
/// without a valid bundle, so `main` aborts with the error instead of
/// retrying.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A required artifact file is absent from the bundle directory.
    #[error("artifact `{}` not found in {}", .name, .dir.display())]
    Missing { name: &'static str, dir: PathBuf },

    /// An artifact file exists but cannot be deserialized, or its shape
    /// violates the bundle invariants.
    #[error("artifact `{name}` is corrupt: {reason}")]
    Corrupt { name: &'static str, reason: String },
}

impl ArtifactError {
    pub fn corrupt(name: &'static str, reason: impl Into<String>) -> Self {
        ArtifactError::Corrupt {
            name,
            reason: reason.into(),
        }
    }
}

/// A requested sample index outside `[0, N)`.
///
/// This is a caller bug: the selection widgets are bounded to the valid
/// range, so an out-of-range request is surfaced loudly instead of being
/// clamped (clamping would mask a broken widget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sample index {requested} is out of range (test set holds {len} samples)")]
pub struct IndexOutOfRange {
    pub requested: usize,
    pub len: usize,
}

/// Failures raised by a model's inference capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The feature vector does not match the model's arity.
    #[error("model expects {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    /// A tree walk escaped its node table. Trees are validated at load
    /// time, so hitting this means the model was mutated after loading.
    #[error("tree {tree} references node {node}, past the {len}-node table")]
    NodeOutOfBounds { tree: usize, node: usize, len: usize },
}

/// Anything that can go wrong between "index selected" and "report shown".
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Selection(#[from] IndexOutOfRange),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}
