//! Classifier abstraction and the gradient-boosted tree implementation.
//!
//! - [`Classifier`]: what the prediction pipeline needs from a trained model
//! - [`GbdtClassifier`]: binary classifier backed by a native [`Forest`](crate::repr::gbdt::Forest)
//! - [`OutputTransform`]: margin-to-probability mapping chosen by the objective

mod classifier;
mod gbdt;
mod transform;

pub use classifier::{Classifier, Label};
pub use gbdt::GbdtClassifier;
pub use transform::OutputTransform;
