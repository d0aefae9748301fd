use crate::color::SegmentPalette;
use crate::data::bundle::ArtifactBundle;
use crate::data::report::{report, PredictionReport};
use crate::data::select::SampleSelection;
use crate::rng::SmallRng;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// The bundle is immutable once loaded; the selection is the only mutable
/// piece of the inspection workflow, and the report is a cache of the
/// last prediction for the current selection.
pub struct AppState {
    /// Loaded artifact bundle (startup load is fail-fast, so always present).
    pub bundle: ArtifactBundle,

    /// Currently selected sample.
    pub selection: SampleSelection,

    /// Last prediction report; cleared whenever the selection changes.
    pub report: Option<PredictionReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Series colours for the histogram and gauge.
    pub palette: SegmentPalette,

    rng: SmallRng,
}

impl AppState {
    pub fn new(bundle: ArtifactBundle) -> Self {
        let selection = SampleSelection::new(bundle.len());
        AppState {
            bundle,
            selection,
            report: None,
            status_message: None,
            palette: SegmentPalette::default(),
            rng: SmallRng::from_entropy(),
        }
    }

    #[cfg(test)]
    fn with_seed(bundle: ArtifactBundle, seed: u64) -> Self {
        let mut state = AppState::new(bundle);
        state.rng = SmallRng::new(seed);
        state
    }

    /// Swap in a newly loaded bundle, resetting the session.
    pub fn set_bundle(&mut self, bundle: ArtifactBundle) {
        self.selection = SampleSelection::new(bundle.len());
        self.bundle = bundle;
        self.report = None;
        self.status_message = None;
    }

    /// Select an explicit sample. A stale report never outlives its sample.
    pub fn select_sample(&mut self, index: usize) {
        match self.selection.select(index) {
            Ok(_) => {
                self.report = None;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("sample selection rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Select a uniformly random sample.
    pub fn select_random_sample(&mut self) {
        self.selection.select_random(&mut self.rng);
        self.report = None;
        self.status_message = None;
    }

    /// Run inference on the current sample and cache the report.
    pub fn run_prediction(&mut self) {
        match report(&self.bundle, self.selection.current()) {
            Ok(r) => {
                log::info!(
                    "sample {}: predicted {:.2}, actual {:.2}, error {:.2}",
                    r.sample_index,
                    r.predicted,
                    r.actual,
                    r.absolute_error
                );
                self.report = Some(r);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("prediction failed: {e}");
                self.report = None;
                self.status_message = Some(format!("Prediction failed: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{bundle_with, FailingModel, FixedModel};

    #[test]
    fn run_prediction_caches_a_report() {
        let mut state = AppState::with_seed(
            bundle_with(Box::new(FixedModel(12.5)), vec![10.0, 170.0]),
            1,
        );
        state.run_prediction();
        let r = state.report.as_ref().expect("report");
        assert_eq!(r.predicted, 12.5);
        assert_eq!(r.absolute_error, 2.5);
    }

    #[test]
    fn changing_selection_clears_the_report() {
        let mut state = AppState::with_seed(
            bundle_with(Box::new(FixedModel(1.0)), vec![0.0, 1.0]),
            1,
        );
        state.run_prediction();
        assert!(state.report.is_some());

        state.select_sample(1);
        assert!(state.report.is_none());
    }

    #[test]
    fn random_selection_clears_the_report_and_stays_in_range() {
        let mut state = AppState::with_seed(
            bundle_with(Box::new(FixedModel(1.0)), vec![0.0, 1.0, 2.0]),
            9,
        );
        state.run_prediction();
        for _ in 0..50 {
            state.select_random_sample();
            assert!(state.selection.current() < 3);
            assert!(state.report.is_none());
        }
    }

    #[test]
    fn failed_prediction_surfaces_a_message() {
        let mut state =
            AppState::with_seed(bundle_with(Box::new(FailingModel), vec![0.0]), 1);
        state.run_prediction();
        assert!(state.report.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Prediction failed")));
    }

    #[test]
    fn set_bundle_resets_selection() {
        let mut state = AppState::with_seed(
            bundle_with(Box::new(FixedModel(1.0)), vec![0.0, 1.0, 2.0]),
            1,
        );
        state.select_sample(2);
        state.run_prediction();

        state.set_bundle(bundle_with(Box::new(FixedModel(2.0)), vec![5.0]));
        assert_eq!(state.selection.current(), 0);
        assert_eq!(state.selection.len(), 1);
        assert!(state.report.is_none());
    }
}
