//! Output transformation for inference.
//!
//! The [`OutputTransform`] enum defines how a raw model margin is turned into
//! the positive-class probability. It is derived from the objective once at
//! load time so that prediction does not need the objective again.

/// Inference-time output transformation for binary objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// Logistic sigmoid: p = 1 / (1 + exp(-margin)).
    /// Used for `binary:logistic` and `reg:logistic`.
    #[default]
    Sigmoid,

    /// Hard step: p = 1 if margin > 0, else 0.
    /// Used for `binary:hinge`.
    Step,
}

impl OutputTransform {
    /// Transform for an XGBoost objective name, if it yields a probability.
    ///
    /// `binary:logitraw` is not one: its prediction is the raw margin.
    pub fn for_objective(objective: &str) -> Option<Self> {
        match objective {
            "binary:logistic" | "reg:logistic" => Some(Self::Sigmoid),
            "binary:hinge" => Some(Self::Step),
            _ => None,
        }
    }

    /// Positive-class probability for a margin.
    ///
    /// NaN margins propagate (garbage-in, garbage-out).
    #[inline]
    pub fn probability(&self, margin: f32) -> f32 {
        match self {
            OutputTransform::Sigmoid => sigmoid(margin),
            OutputTransform::Step => {
                if margin > 0.0 {
                    1.0
                } else if margin.is_nan() {
                    f32::NAN
                } else {
                    0.0
                }
            }
        }
    }
}

/// Numerically stable sigmoid.
/// Clamps input to [-500, 500] to prevent overflow.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_zero_is_half() {
        assert_abs_diff_eq!(OutputTransform::Sigmoid.probability(0.0), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn sigmoid_output_in_zero_one() {
        for x in [-1000.0, -10.0, -1.0, 0.0, 1.0, 10.0, 1000.0] {
            let p = OutputTransform::Sigmoid.probability(x);
            assert!((0.0..=1.0).contains(&p), "sigmoid({x}) = {p} not in [0,1]");
        }
    }

    #[test]
    fn sigmoid_is_symmetric() {
        let p = OutputTransform::Sigmoid.probability(0.8);
        let q = OutputTransform::Sigmoid.probability(-0.8);
        assert_abs_diff_eq!(p + q, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn step_thresholds_at_zero() {
        assert_eq!(OutputTransform::Step.probability(0.3), 1.0);
        assert_eq!(OutputTransform::Step.probability(0.0), 0.0);
        assert_eq!(OutputTransform::Step.probability(-2.0), 0.0);
    }

    #[test]
    fn objective_mapping() {
        assert_eq!(
            OutputTransform::for_objective("binary:logistic"),
            Some(OutputTransform::Sigmoid)
        );
        assert_eq!(
            OutputTransform::for_objective("binary:hinge"),
            Some(OutputTransform::Step)
        );
        assert_eq!(OutputTransform::for_objective("multi:softprob"), None);
        assert_eq!(OutputTransform::for_objective("binary:logitraw"), None);
    }
}
