//! The prediction form: one input per expected feature.
//!
//! Categorical features (those with an encoder) are collected as text;
//! every other feature is numeric and pre-filled with its median.

use std::fmt;

use crate::catalog;
use crate::config::MissingMedianPolicy;
use crate::preprocess::{EncoderTable, FeatureRecord, FeatureValue, MedianTable};

pub const TITLE: &str = "Exoplanet Prediction";
pub const INSTRUCTIONS: &str = "Input the KOI features to predict if it is a confirmed exoplanet.";
pub const SUBMIT_LABEL: &str = "Predict";

/// Errors raised while building the form or collecting answers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectError {
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("invalid number {value:?} for feature `{feature}`")]
    InvalidNumber { feature: String, value: String },

    #[error("numeric feature `{0}` has no median to pre-fill")]
    MissingMedian(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free-form categorical token.
    Text,
    /// Number entry with a pre-filled default.
    Number { default: f64 },
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("text"),
            FieldKind::Number { default } => write!(f, "number, default {default}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
}

impl InputField {
    fn new(name: &str, kind: FieldKind) -> Self {
        let label = match kind {
            FieldKind::Text => format!("{} (categorical)", catalog::display_name(name)),
            FieldKind::Number { .. } => catalog::display_name(name).to_string(),
        };
        Self {
            name: name.to_string(),
            label,
            kind,
        }
    }

    /// Value the field holds when left untouched.
    pub fn default_value(&self) -> FeatureValue {
        match self.kind {
            FieldKind::Text => FeatureValue::Text(String::new()),
            FieldKind::Number { default } => FeatureValue::Number(default),
        }
    }

    /// Parse a raw answer for this field.
    ///
    /// Text answers are kept verbatim so the encoder sees the exact token.
    /// A blank number answer takes the default, and `nan` marks the value as
    /// missing so the median imputation fills it.
    pub fn parse(&self, raw: &str) -> Result<FeatureValue, CollectError> {
        match self.kind {
            FieldKind::Text => Ok(FeatureValue::Text(raw.to_string())),
            FieldKind::Number { .. } => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(self.default_value());
                }
                let n: f64 = raw.parse().map_err(|_| CollectError::InvalidNumber {
                    feature: self.name.clone(),
                    value: raw.to_string(),
                })?;
                Ok(if n.is_nan() {
                    FeatureValue::Missing
                } else {
                    FeatureValue::Number(n)
                })
            }
        }
    }
}

/// The rendered form, in the classifier's feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct InputForm {
    fields: Vec<InputField>,
}

impl InputForm {
    /// Derive one field per feature.
    ///
    /// A numeric feature without a median is pre-filled with `0.0` under
    /// [`MissingMedianPolicy::Zero`] and rejected under
    /// [`MissingMedianPolicy::Strict`].
    pub fn build(
        features: &[String],
        encoders: &EncoderTable,
        medians: &MedianTable,
        policy: MissingMedianPolicy,
    ) -> Result<Self, CollectError> {
        let fields = features
            .iter()
            .map(|name| {
                if encoders.contains(name) {
                    return Ok(InputField::new(name, FieldKind::Text));
                }
                let default = match (medians.get(name), policy) {
                    (Some(m), _) => m,
                    (None, MissingMedianPolicy::Zero) => {
                        tracing::warn!(feature = %name, "no median for numeric feature, pre-filling 0.0");
                        0.0
                    }
                    (None, MissingMedianPolicy::Strict) => {
                        return Err(CollectError::MissingMedian(name.clone()))
                    }
                };
                Ok(InputField::new(name, FieldKind::Number { default }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    pub fn title(&self) -> &'static str {
        TITLE
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn require_field(&self, name: &str) -> Result<&InputField, CollectError> {
        self.field(name)
            .ok_or_else(|| CollectError::UnknownFeature(name.to_string()))
    }

    /// Parse a raw answer for the named field.
    pub fn parse_answer(&self, name: &str, raw: &str) -> Result<FeatureValue, CollectError> {
        self.require_field(name)?.parse(raw)
    }

    /// Build a complete record from raw answers; unanswered fields take
    /// their defaults.
    pub fn collect<I, K, V>(&self, answers: I) -> Result<FeatureRecord, CollectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.collect_into(FeatureRecord::new(), answers)
    }

    /// Like [`collect`](Self::collect), but answers overlay `base`.
    pub fn collect_into<I, K, V>(
        &self,
        mut base: FeatureRecord,
        answers: I,
    ) -> Result<FeatureRecord, CollectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, raw) in answers {
            let name = name.as_ref();
            let value = self.parse_answer(name, raw.as_ref())?;
            base.insert(name, value);
        }
        self.complete(base)
    }

    /// Fill every absent field with its default.
    ///
    /// Text given to a numeric field is parsed as a raw answer. Features the
    /// form does not know are rejected.
    pub fn complete(&self, mut record: FeatureRecord) -> Result<FeatureRecord, CollectError> {
        if let Some((extra, _)) = record.iter().find(|(name, _)| self.field(name).is_none()) {
            return Err(CollectError::UnknownFeature(extra.to_string()));
        }

        for field in &self.fields {
            let value = match (record.get(&field.name), field.kind) {
                (None, _) => field.default_value(),
                (Some(FeatureValue::Text(raw)), FieldKind::Number { .. }) => field.parse(raw)?,
                (Some(_), _) => continue,
            };
            record.insert(field.name.as_str(), value);
        }
        Ok(record)
    }
}
