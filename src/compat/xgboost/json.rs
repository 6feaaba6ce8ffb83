//! XGBoost JSON model loader.
//!
//! Parses the JSON written by `Booster.save_model("model.json")` (XGBoost >= 1.0).
//! These are "foreign types" used only for parsing; see `convert.rs` for the
//! conversion to native types. Fields that inference does not need are left
//! out and ignored by serde.

use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

// =============================================================================
// Custom deserializers for XGBoost-specific formats
// =============================================================================

/// `base_score` is written as a number, a string (`"5E-1"`), an array, or a
/// bracketed string (`"[5E-1]"`) depending on the XGBoost version.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                if let Ok(f) = s.parse::<f32>() {
                    return Ok(f);
                }
                let t = s.trim();
                if let Some(inner) = t.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    if let Ok(f) = inner.parse::<f32>() {
                        return Ok(f);
                    }
                }
                return Err(SerdeError::custom(format!(
                    "cannot parse base_score from string: {s}"
                )));
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| SerdeError::custom("empty base_score array"))?;
            }
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ));
            }
        }
    }
}

/// `default_left` flags are written as booleans by some versions and as
/// 0/1 integers by others.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(Vec::<Flag>::deserialize(deserializer)?
        .into_iter()
        .map(|flag| match flag {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

fn default_num_class() -> i64 {
    0
}

// =============================================================================
// Tree / model level definitions
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    #[serde(default)]
    pub id: i32,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    /// Threshold for split nodes, leaf value for leaves.
    pub split_conditions: Vec<f32>,
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    #[serde(default)]
    pub categories: Vec<i32>,
    #[serde(default)]
    pub categories_nodes: Vec<i32>,
    #[serde(default)]
    pub categories_segments: Vec<i64>,
    #[serde(default)]
    pub categories_sizes: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
}

impl ModelTrees {
    /// Number of trees in this model.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

// =============================================================================
// Gradient booster variants (gbtree | gblinear | dart)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Gblinear {},
    Dart {
        gbtree: GBTreeDefinition,
        weight_drop: Vec<f32>,
    },
}

impl GradientBooster {
    /// Booster name as it appears in XGBoost JSON.
    pub fn name(&self) -> &'static str {
        match self {
            GradientBooster::Gbtree { .. } => "gbtree",
            GradientBooster::Gblinear { .. } => "gblinear",
            GradientBooster::Dart { .. } => "dart",
        }
    }
}

// =============================================================================
// Objective / learner-level definitions
// =============================================================================

/// Learner objective. Only the name matters for inference; objective
/// parameters are training-time settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde(rename = "num_class", default = "default_num_class")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_class: i64,
    #[serde(rename = "num_feature")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_features: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// =============================================================================
// Top-level XGBoost model
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub version: [u32; 3],
    pub learner: Learner,
}

impl XgbModel {
    /// Parse a model from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Parse a model from a serde_json Value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Ordered feature names the model was trained on.
    pub fn feature_names(&self) -> &[String] {
        &self.learner.feature_names
    }

    /// Objective name, e.g. `binary:logistic`.
    pub fn objective_name(&self) -> &str {
        &self.learner.objective.name
    }
}

// =============================================================================
// Tests
// =============================================================================
