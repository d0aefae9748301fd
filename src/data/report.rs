use crate::data::bundle::{ArtifactBundle, AXIAL_RANGE};
use crate::error::ReportError;

// ---------------------------------------------------------------------------
// Prediction report
// ---------------------------------------------------------------------------

/// Outcome of running the model on one held-out sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub sample_index: usize,
    /// Model output in axial units (0 = head, 180 = feet).
    pub predicted: f64,
    /// Ground-truth label for the same sample.
    pub actual: f64,
    /// `|predicted - actual|`, never clamped.
    pub absolute_error: f64,
    /// `predicted / 180` clamped to `[0, 1]` for the position gauge.
    /// Only the prediction drives the gauge; slightly out-of-range
    /// predictions near the body's extremities are clamped, not rejected.
    pub gauge_fraction: f64,
}

/// Run inference on the selected sample and compare against its label.
pub fn report(bundle: &ArtifactBundle, index: usize) -> Result<PredictionReport, ReportError> {
    let sample = bundle.sample(index)?;
    let predicted = bundle.model.infer(sample.features)?;
    let actual = sample.label;

    Ok(PredictionReport {
        sample_index: sample.index,
        predicted,
        actual,
        absolute_error: (predicted - actual).abs(),
        gauge_fraction: (predicted / AXIAL_RANGE).clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{bundle_with, FailingModel, FixedModel};
    use crate::error::{IndexOutOfRange, ReportError};

    #[test]
    fn report_compares_prediction_against_label() {
        let bundle = bundle_with(Box::new(FixedModel(12.5)), vec![10.0, 170.0]);
        let r = report(&bundle, 0).expect("report");
        assert_eq!(r.sample_index, 0);
        assert_eq!(r.predicted, 12.5);
        assert_eq!(r.actual, 10.0);
        assert_eq!(r.absolute_error, 2.5);
        assert_eq!(r.gauge_fraction, 12.5 / 180.0);
    }

    #[test]
    fn error_is_symmetric_in_sign() {
        let bundle = bundle_with(Box::new(FixedModel(12.5)), vec![10.0, 170.0]);
        let r = report(&bundle, 1).expect("report");
        assert_eq!(r.absolute_error, 157.5);
        assert!(r.absolute_error >= 0.0);
    }

    #[test]
    fn gauge_clamps_above_range_but_error_does_not() {
        let bundle = bundle_with(Box::new(FixedModel(200.0)), vec![170.0]);
        let r = report(&bundle, 0).expect("report");
        assert_eq!(r.gauge_fraction, 1.0);
        assert_eq!(r.absolute_error, 30.0);
    }

    #[test]
    fn gauge_clamps_below_zero() {
        let bundle = bundle_with(Box::new(FixedModel(-4.0)), vec![3.0]);
        let r = report(&bundle, 0).expect("report");
        assert_eq!(r.gauge_fraction, 0.0);
        assert_eq!(r.absolute_error, 7.0);
    }

    #[test]
    fn out_of_range_index_propagates() {
        let bundle = bundle_with(Box::new(FixedModel(1.0)), vec![1.0]);
        match report(&bundle, 1) {
            Err(ReportError::Selection(e)) => {
                assert_eq!(e, IndexOutOfRange { requested: 1, len: 1 });
            }
            other => panic!("expected selection error, got {other:?}"),
        }
    }

    #[test]
    fn inference_failure_propagates() {
        let bundle = bundle_with(Box::new(FailingModel), vec![1.0]);
        assert!(matches!(report(&bundle, 0), Err(ReportError::Inference(_))));
    }
}
