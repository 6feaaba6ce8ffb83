//! The input-to-prediction pipeline.
//!
//! ```text
//! raw record -> encode -> impute -> assemble -> classifier -> Verdict
//! ```
//!
//! Each run is independent: the record is consumed and nothing is kept
//! between requests.

use std::fmt;

use ndarray::Array1;
use serde::Serialize;

use crate::model::{Classifier, Label};
use crate::preprocess::{
    preprocess, EncoderTable, EncodingError, FeatureRecord, MedianTable, SchemaMismatchError,
};

/// Errors that abort a single prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),

    #[error("classifier returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),
}

impl PredictError {
    /// True for errors caused by the submitted values rather than by the
    /// deployment.
    pub fn is_validation(&self) -> bool {
        matches!(self, PredictError::Encoding(_))
    }

    /// Message suitable for the end user.
    ///
    /// Validation failures name the offending value; internal faults stay
    /// generic.
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            "Internal error: the prediction could not be completed.".to_string()
        }
    }
}

/// Outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    /// Positive-class probability as returned by the classifier.
    pub positive_probability: f64,
    /// Probability of the predicted label, in `[0, 1]`.
    pub confidence: f64,
}

impl Verdict {
    pub fn new(label: Label, positive_probability: f64) -> Self {
        let confidence = match label {
            Label::Positive => positive_probability,
            Label::Negative => 1.0 - positive_probability,
        };
        Self {
            label,
            positive_probability,
            confidence,
        }
    }

    pub fn is_exoplanet(&self) -> bool {
        self.label.is_positive()
    }

    /// Result message, confidence rounded to two decimals.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Label::Positive => write!(
                f,
                "This candidate is predicted to be an EXOPLANET! (Confidence: {:.2})",
                self.confidence
            ),
            Label::Negative => write!(
                f,
                "This candidate is predicted to be NOT an EXOPLANET. (Confidence: {:.2})",
                self.confidence
            ),
        }
    }
}

/// Encode, impute and assemble `raw` into the classifier's input row.
pub fn prepare<C: Classifier + ?Sized>(
    mut raw: FeatureRecord,
    classifier: &C,
    medians: &MedianTable,
    encoders: &EncoderTable,
) -> Result<Array1<f32>, PredictError> {
    preprocess(&mut raw, encoders, medians)?;
    let row = raw.assemble(classifier.expected_features())?;
    tracing::debug!(n_features = row.len(), "assembled feature row");
    Ok(row)
}

/// Run the classifier once on an assembled row.
pub fn infer<C: Classifier + ?Sized>(
    classifier: &C,
    row: &Array1<f32>,
) -> Result<Verdict, PredictError> {
    let label = classifier.predict(row.view());
    let [_, p] = classifier.predict_proba(row.view());
    if !(0.0..=1.0).contains(&p) {
        return Err(PredictError::InvalidProbability(p));
    }
    let verdict = Verdict::new(label, p);
    tracing::debug!(label = ?verdict.label, probability = p, "inferred");
    Ok(verdict)
}

/// Full pipeline: encode, impute, order, infer, render.
pub fn predict<C: Classifier + ?Sized>(
    raw: FeatureRecord,
    classifier: &C,
    medians: &MedianTable,
    encoders: &EncoderTable,
) -> Result<Verdict, PredictError> {
    let row = prepare(raw, classifier, medians, encoders)?;
    infer(classifier, &row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::FeatureValue;
    use crate::testing::FixedClassifier;

    #[test]
    fn negative_confidence_is_complement() {
        let v = Verdict::new(Label::Negative, 0.2);
        assert_eq!(v.confidence, 1.0 - 0.2);
        assert!(!v.is_exoplanet());
        assert_eq!(
            v.message(),
            "This candidate is predicted to be NOT an EXOPLANET. (Confidence: 0.80)"
        );
    }

    #[test]
    fn positive_message_rounds_for_display_only() {
        let v = Verdict::new(Label::Positive, 0.87654);
        assert_eq!(v.confidence, 0.87654);
        assert_eq!(
            v.to_string(),
            "This candidate is predicted to be an EXOPLANET! (Confidence: 0.88)"
        );
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let clf = FixedClassifier::new(["koi_period"], Label::Positive, 1.5);
        let mut record = FeatureRecord::new();
        record.insert("koi_period", 1.0);
        let err = predict(record, &clf, &MedianTable::new(), &EncoderTable::new()).unwrap_err();
        assert_eq!(err, PredictError::InvalidProbability(1.5));
        assert!(!err.is_validation());
        assert!(err.user_message().starts_with("Internal error"));
    }

    #[test]
    fn schema_mismatch_surfaces_as_internal_fault() {
        let clf = FixedClassifier::new(["koi_period", "koi_depth"], Label::Positive, 0.9);
        let mut record = FeatureRecord::new();
        record.insert("koi_period", FeatureValue::Missing);
        let err = predict(record, &clf, &MedianTable::new(), &EncoderTable::new()).unwrap_err();
        assert_eq!(
            err,
            PredictError::Schema(SchemaMismatchError::MissingFeature("koi_depth".into()))
        );
        assert!(!err.is_validation());
    }
}
