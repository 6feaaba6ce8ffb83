use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Binary class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Class `0`: not a confirmed exoplanet.
    Negative,
    /// Class `1`: confirmed exoplanet.
    Positive,
}

impl Label {
    /// Label for a positive-class probability, thresholded at 0.5.
    #[inline]
    pub fn from_probability(p: f64) -> Self {
        if p > 0.5 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        self == Label::Positive
    }
}

/// A trained binary classifier.
///
/// Implementations are immutable after construction and shared read-only for
/// the process lifetime, hence `Send + Sync`.
///
/// # Sample layout
///
/// `sample` holds one value per entry of [`expected_features`](Self::expected_features),
/// in that order. NaN marks a missing value.
pub trait Classifier: Send + Sync {
    /// Ordered feature names the model was trained on.
    fn expected_features(&self) -> &[String];

    /// Predicted class for one sample.
    fn predict(&self, sample: ArrayView1<'_, f32>) -> Label;

    /// Class probabilities `[p0, p1]` for one sample.
    fn predict_proba(&self, sample: ArrayView1<'_, f32>) -> [f64; 2];

    /// Number of expected features.
    fn n_features(&self) -> usize {
        self.expected_features().len()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn expected_features(&self) -> &[String] {
        (**self).expected_features()
    }

    fn predict(&self, sample: ArrayView1<'_, f32>) -> Label {
        (**self).predict(sample)
    }

    fn predict_proba(&self, sample: ArrayView1<'_, f32>) -> [f64; 2] {
        (**self).predict_proba(sample)
    }
}
