//! Binary classifier backed by a gradient-boosted tree forest.

use ndarray::ArrayView1;

use crate::repr::gbdt::Forest;

use super::{Classifier, Label, OutputTransform};

/// Gradient-boosted tree classifier.
///
/// Usually obtained from [`XgbModel::to_classifier`](crate::compat::XgbModel::to_classifier).
///
/// # Example
///
/// ```ignore
/// use koi_predict::compat::XgbModel;
/// use koi_predict::model::Classifier;
///
/// let model = XgbModel::from_reader(std::fs::File::open("model.json")?)?;
/// let classifier = model.to_classifier()?;
/// println!("{:?}", classifier.expected_features());
/// ```
#[derive(Debug, Clone)]
pub struct GbdtClassifier {
    feature_names: Vec<String>,
    forest: Forest,
    transform: OutputTransform,
}

impl GbdtClassifier {
    pub fn new(feature_names: Vec<String>, forest: Forest, transform: OutputTransform) -> Self {
        Self {
            feature_names,
            forest,
            transform,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    /// Raw margin for one sample.
    pub fn predict_margin(&self, sample: ArrayView1<'_, f32>) -> f32 {
        debug_assert_eq!(sample.len(), self.feature_names.len());
        self.forest.predict_margin(sample)
    }

    fn positive_probability(&self, sample: ArrayView1<'_, f32>) -> f64 {
        f64::from(self.transform.probability(self.predict_margin(sample)))
    }
}

impl Classifier for GbdtClassifier {
    fn expected_features(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, sample: ArrayView1<'_, f32>) -> Label {
        Label::from_probability(self.positive_probability(sample))
    }

    fn predict_proba(&self, sample: ArrayView1<'_, f32>) -> [f64; 2] {
        let p = self.positive_probability(sample);
        [1.0 - p, p]
    }
}
