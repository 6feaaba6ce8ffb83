//! Testing utilities for koi-predict.
//!
//! Stub classifiers and float assertions shared by unit tests and
//! integration tests.
//!
//! ```ignore
//! use koi_predict::testing::{FixedClassifier, DEFAULT_TOLERANCE};
//! ```

use std::sync::Mutex;

use ndarray::{Array1, ArrayView1};

use crate::model::{Classifier, Label};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for probability comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Tolerance for values that went through `f32` margins.
pub const MARGIN_TOLERANCE: f32 = 1e-5;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two float values are approximately equal.
///
/// # Examples
///
/// ```
/// # use koi_predict::assert_approx_eq;
/// assert_approx_eq!(0.87f64, 0.8700001f64, 1e-6);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val = $left;
        let right_val = $right;
        let tol = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
}

// =============================================================================
// Stub classifiers
// =============================================================================

/// A classifier that always returns the same label and probability.
///
/// Records the last sample it was given so tests can inspect the assembled
/// row.
#[derive(Debug)]
pub struct FixedClassifier {
    features: Vec<String>,
    label: Label,
    positive_probability: f64,
    last_sample: Mutex<Option<Array1<f32>>>,
}

impl FixedClassifier {
    pub fn new<I, S>(features: I, label: Label, positive_probability: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            label,
            positive_probability,
            last_sample: Mutex::new(None),
        }
    }

    /// The most recent sample passed to `predict` or `predict_proba`.
    pub fn last_sample(&self) -> Option<Array1<f32>> {
        self.last_sample.lock().ok().and_then(|s| s.clone())
    }

    fn record(&self, sample: ArrayView1<'_, f32>) {
        if let Ok(mut last) = self.last_sample.lock() {
            *last = Some(sample.to_owned());
        }
    }
}

impl Classifier for FixedClassifier {
    fn expected_features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, sample: ArrayView1<'_, f32>) -> Label {
        self.record(sample);
        self.label
    }

    fn predict_proba(&self, sample: ArrayView1<'_, f32>) -> [f64; 2] {
        self.record(sample);
        [1.0 - self.positive_probability, self.positive_probability]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fixed_classifier_records_samples() {
        let clf = FixedClassifier::new(["a", "b"], Label::Negative, 0.2);
        assert!(clf.last_sample().is_none());
        assert_eq!(clf.predict(array![1.0f32, 2.0].view()), Label::Negative);
        assert_eq!(clf.last_sample(), Some(array![1.0f32, 2.0]));
        let [p0, p1] = clf.predict_proba(array![1.0f32, 2.0].view());
        crate::assert_approx_eq!(p0, 0.8, DEFAULT_TOLERANCE);
        crate::assert_approx_eq!(p1, 0.2, DEFAULT_TOLERANCE);
    }
}
