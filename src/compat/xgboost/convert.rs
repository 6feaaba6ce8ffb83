//! Conversion from XGBoost JSON types to native types.

use std::collections::HashMap;

use crate::model::{GbdtClassifier, OutputTransform};
use crate::repr::gbdt::{categories_to_bitset, Forest, MutableTree, Tree, TreeValidationError};

use super::json::{GradientBooster, Tree as XgbTree, XgbModel};

/// Error type for XGBoost model conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("booster `{0}` is not supported; expected a tree booster (gbtree or dart)")]
    UnsupportedBooster(&'static str),
    #[error("objective `{0}` is not a binary classification objective")]
    UnsupportedObjective(String),
    #[error("model has {0} classes; only binary classifiers are supported")]
    Multiclass(i64),
    #[error("model carries no feature names; save it from a booster trained with named features")]
    MissingFeatureNames,
    #[error("model lists {names} feature names but declares num_feature = {declared}")]
    FeatureCountMismatch { names: usize, declared: i64 },
    #[error("tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },
    #[error(
        "invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes"
    )]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("tree {tree} is structurally invalid: {source}")]
    InvalidTree {
        tree: usize,
        #[source]
        source: TreeValidationError,
    },
    #[error("split on feature index {index} but the model only has {n_features} features")]
    FeatureIndexOutOfRange { index: u32, n_features: usize },
    #[error("dart model has {trees} trees but {weights} drop weights")]
    DartWeightsLenMismatch { trees: usize, weights: usize },
}

/// Convert base_score from probability space to margin space based on objective.
///
/// XGBoost stores base_score in probability/original space in JSON, but the
/// predictor works in margin space. This replicates XGBoost's `ProbToMargin`.
fn prob_to_margin(base_score: f32, objective: &str) -> f32 {
    match objective {
        // logit(p) = log(p / (1 - p))
        "binary:logistic" | "reg:logistic" => {
            let p = base_score.clamp(1e-7, 1.0 - 1e-7);
            (p / (1.0 - p)).ln()
        }
        _ => base_score,
    }
}

impl XgbModel {
    /// Returns true if this model uses DART booster.
    pub fn is_dart(&self) -> bool {
        matches!(&self.learner.gradient_booster, GradientBooster::Dart { .. })
    }

    /// Convert the tree ensemble to a native single-output [`Forest`].
    ///
    /// DART models keep their per-tree drop weights.
    pub fn to_forest(&self) -> Result<Forest, ConversionError> {
        let (model_trees, weights) = match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => (&gbtree.model, Some(weight_drop.as_slice())),
            other => return Err(ConversionError::UnsupportedBooster(other.name())),
        };

        let n_class = self.learner.learner_model_param.n_class;
        if n_class > 1 {
            return Err(ConversionError::Multiclass(n_class));
        }

        if let Some(weights) = weights {
            if weights.len() != model_trees.num_trees() {
                return Err(ConversionError::DartWeightsLenMismatch {
                    trees: model_trees.num_trees(),
                    weights: weights.len(),
                });
            }
        }

        let raw_base_score = self.learner.learner_model_param.base_score;
        let mut forest = Forest::new(prob_to_margin(raw_base_score, self.objective_name()));

        for (tree_idx, xgb_tree) in model_trees.trees.iter().enumerate() {
            let native_tree = convert_tree(xgb_tree, tree_idx)?;
            let weight = weights.map_or(1.0, |w| w[tree_idx]);
            forest.push_weighted_tree(native_tree, weight);
        }

        Ok(forest)
    }

    /// Convert to a binary [`GbdtClassifier`].
    ///
    /// The classifier caches the model's feature names as its expected
    /// feature order.
    pub fn to_classifier(&self) -> Result<GbdtClassifier, ConversionError> {
        let objective = self.objective_name();
        let transform = OutputTransform::for_objective(objective)
            .ok_or_else(|| ConversionError::UnsupportedObjective(objective.to_string()))?;

        let feature_names = self.feature_names();
        if feature_names.is_empty() {
            return Err(ConversionError::MissingFeatureNames);
        }
        let declared = self.learner.learner_model_param.n_features;
        if declared != feature_names.len() as i64 {
            return Err(ConversionError::FeatureCountMismatch {
                names: feature_names.len(),
                declared,
            });
        }

        let forest = self.to_forest()?;
        if let Some(index) = forest.max_split_index() {
            if index as usize >= feature_names.len() {
                return Err(ConversionError::FeatureIndexOutOfRange {
                    index,
                    n_features: feature_names.len(),
                });
            }
        }

        Ok(GbdtClassifier::new(feature_names.to_vec(), forest, transform))
    }
}

/// Convert a single XGBoost tree to native [`Tree`].
fn convert_tree(xgb_tree: &XgbTree, tree_idx: usize) -> Result<Tree, ConversionError> {
    let num_nodes = usize::try_from(xgb_tree.tree_param.num_nodes).unwrap_or(0);
    let malformed = |reason: String| ConversionError::MalformedTree {
        tree: tree_idx,
        reason,
    };

    for (field, len) in [
        ("left_children", xgb_tree.left_children.len()),
        ("right_children", xgb_tree.right_children.len()),
        ("split_indices", xgb_tree.split_indices.len()),
        ("split_conditions", xgb_tree.split_conditions.len()),
        ("default_left", xgb_tree.default_left.len()),
    ] {
        if len < num_nodes {
            return Err(malformed(format!(
                "{field} has {len} entries but the tree has {num_nodes} nodes"
            )));
        }
    }

    let mut categorical_map = build_categorical_map(xgb_tree).map_err(malformed)?;
    let mut tree = MutableTree::with_n_nodes(num_nodes);

    // XGBoost stores nodes in BFS order, which matches the native layout.
    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];
        let right_child = xgb_tree.right_children[node_idx];

        // A node is a leaf if left_child == -1; its value lives in split_conditions.
        if left_child == -1 {
            tree.make_leaf(node_idx as u32, xgb_tree.split_conditions[node_idx]);
            continue;
        }

        for child in [left_child, right_child] {
            if child < 0 || child as usize >= num_nodes {
                return Err(ConversionError::InvalidNodeIndex {
                    tree: tree_idx,
                    node: node_idx,
                    child,
                    num_nodes,
                });
            }
        }

        let feature_index = u32::try_from(xgb_tree.split_indices[node_idx])
            .map_err(|_| malformed(format!("node {node_idx} has a negative split index")))?;
        let default_left = xgb_tree.default_left[node_idx];

        // split_type: 0 = numeric, 1 = categorical
        let is_categorical = xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) == 1;
        if is_categorical {
            let bitset = categorical_map.remove(&node_idx).unwrap_or_default();
            tree.set_categorical_split(
                node_idx as u32,
                feature_index,
                bitset,
                default_left,
                left_child as u32,
                right_child as u32,
            );
        } else {
            tree.set_numeric_split(
                node_idx as u32,
                feature_index,
                xgb_tree.split_conditions[node_idx],
                default_left,
                left_child as u32,
                right_child as u32,
            );
        }
    }

    tree.freeze().map_err(|source| ConversionError::InvalidTree {
        tree: tree_idx,
        source,
    })
}

/// Build a map from node index to category bitset.
///
/// XGBoost JSON stores categorical splits in parallel arrays:
/// - categories_nodes: which node indices have categorical splits
/// - categories_segments: start index into `categories` for each node
/// - categories_sizes: number of category values for each node
/// - categories: flat array of category integer values (not bitset words)
fn build_categorical_map(xgb_tree: &XgbTree) -> Result<HashMap<usize, Vec<u32>>, String> {
    let mut map = HashMap::new();

    for (i, &node) in xgb_tree.categories_nodes.iter().enumerate() {
        let (Some(&start), Some(&size)) = (
            xgb_tree.categories_segments.get(i),
            xgb_tree.categories_sizes.get(i),
        ) else {
            return Err(format!("categorical node {node} has no segment"));
        };

        let values = usize::try_from(start)
            .ok()
            .zip(usize::try_from(size).ok())
            .and_then(|(start, size)| {
                let end = start.checked_add(size)?;
                xgb_tree.categories.get(start..end)
            })
            .ok_or_else(|| format!("categorical node {node} segment is out of bounds"))?;

        let values: Vec<u32> = values
            .iter()
            .map(|&c| u32::try_from(c))
            .collect::<Result<_, _>>()
            .map_err(|_| format!("categorical node {node} has a negative category"))?;

        map.insert(node as usize, categories_to_bitset(&values));
    }

    Ok(map)
}
