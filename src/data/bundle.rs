use crate::error::IndexOutOfRange;
use crate::inference::transform::{Imputer, StandardScaler};
use crate::inference::Regressor;

// ---------------------------------------------------------------------------
// Shape constants (fixed by the upstream feature-extraction scheme)
// ---------------------------------------------------------------------------

/// Directional readings per CT slice.
pub const FEATURE_COUNT: usize = 384;

/// The first 241 readings describe bone density.
pub const BONE_BIN_COUNT: usize = 241;

/// The remaining 143 readings describe air presence.
pub const AIR_BIN_COUNT: usize = FEATURE_COUNT - BONE_BIN_COUNT;

/// Nominal axial span in relative units: 0 = head, 180 = feet.
pub const AXIAL_RANGE: f64 = 180.0;

// ---------------------------------------------------------------------------
// FeatureMatrix – the held-out feature rows
// ---------------------------------------------------------------------------

/// Row-major `rows × FEATURE_COUNT` matrix of the held-out split.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from a flat row-major buffer. Returns a reason string on a
    /// shape mismatch so the loader can wrap it as a corrupt artifact.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, String> {
        if data.len() != rows * cols {
            return Err(format!(
                "buffer holds {} values, expected {rows}×{cols}",
                data.len()
            ));
        }
        Ok(FeatureMatrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }
}

// ---------------------------------------------------------------------------
// ArtifactBundle – everything loaded at startup, immutable thereafter
// ---------------------------------------------------------------------------

/// The six artifacts, loaded once and shared read-only for the rest of
/// the session. The only mutable state anywhere in the app is the
/// selected sample index, which lives in the session, not here.
pub struct ArtifactBundle {
    pub model: Box<dyn Regressor>,
    pub scaler: StandardScaler,
    pub imputer: Imputer,
    pub feature_names: Vec<String>,
    pub features: FeatureMatrix,
    pub labels: Vec<f64>,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("model", &self.model.describe())
            .field("scaler", &self.scaler)
            .field("imputer", &self.imputer)
            .field("feature_names", &self.feature_names)
            .field("features", &self.features)
            .field("labels", &self.labels)
            .finish()
    }
}

impl ArtifactBundle {
    /// Number of held-out samples.
    pub fn len(&self) -> usize {
        self.features.rows()
    }

    /// Per-request view of one sample; re-derived on every selection.
    pub fn sample(&self, index: usize) -> Result<Sample<'_>, IndexOutOfRange> {
        let features = self.features.row(index).ok_or(IndexOutOfRange {
            requested: index,
            len: self.len(),
        })?;
        Ok(Sample {
            index,
            features,
            label: self.labels[index],
        })
    }

    /// Split one sample's feature vector into its bone and air segments.
    pub fn segments(&self, index: usize) -> Result<FeatureSegments<'_>, IndexOutOfRange> {
        Ok(self.sample(index)?.segments())
    }
}

// ---------------------------------------------------------------------------
// Sample / FeatureSegments – borrowed per-request views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub index: usize,
    pub features: &'a [f64],
    pub label: f64,
}

impl<'a> Sample<'a> {
    pub fn segments(&self) -> FeatureSegments<'a> {
        let (bone, air) = self.features.split_at(BONE_BIN_COUNT);
        FeatureSegments { bone, air }
    }
}

/// The fixed bone/air partition of one feature vector. Bin positions are
/// global: bone occupies `0..=240`, air `241..=383`, so the two segments
/// stay disjoint on a shared axis instead of overlapping at zero.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSegments<'a> {
    pub bone: &'a [f64],
    pub air: &'a [f64],
}

impl FeatureSegments<'_> {
    /// Bone readings paired with their global bin positions.
    pub fn bone_bars(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.bone.iter().copied().enumerate()
    }

    /// Air readings paired with their global bin positions.
    pub fn air_bars(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.air
            .iter()
            .copied()
            .enumerate()
            .map(|(i, v)| (BONE_BIN_COUNT + i, v))
    }
}
