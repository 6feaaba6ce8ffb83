//! Feature records: one raw or processed value per feature name.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single feature value as it moves through the pipeline.
///
/// Collected values are [`Text`](Self::Text) (categorical) or
/// [`Number`](Self::Number); encoding turns text into [`Code`](Self::Code).
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Raw categorical token.
    Text(String),
    /// Numeric value. NaN counts as missing.
    Number(f64),
    /// Encoded categorical value.
    Code(u32),
    /// No value supplied.
    Missing,
}

impl FeatureValue {
    /// True for [`Missing`](Self::Missing) and NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            FeatureValue::Missing => true,
            FeatureValue::Number(n) => n.is_nan(),
            FeatureValue::Text(_) | FeatureValue::Code(_) => false,
        }
    }

    /// Raw categorical token, if this is unencoded text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used when assembling the model input.
    ///
    /// Missing values become NaN; text has no numeric view.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FeatureValue::Number(n) => Some(*n as f32),
            FeatureValue::Code(c) => Some(*c as f32),
            FeatureValue::Missing => Some(f32::NAN),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => write!(f, "{s:?}"),
            FeatureValue::Number(n) => write!(f, "{n}"),
            FeatureValue::Code(c) => write!(f, "#{c}"),
            FeatureValue::Missing => f.write_str("<missing>"),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Text(s) => serializer.serialize_str(s),
            FeatureValue::Number(n) if n.is_nan() => serializer.serialize_none(),
            FeatureValue::Number(n) => serializer.serialize_f64(*n),
            FeatureValue::Code(c) => serializer.serialize_u32(*c),
            FeatureValue::Missing => serializer.serialize_none(),
        }
    }
}

/// JSON `null` maps to [`Missing`](FeatureValue::Missing), strings to
/// [`Text`](FeatureValue::Text), numbers to [`Number`](FeatureValue::Number).
impl<'de> Deserialize<'de> for FeatureValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            None => FeatureValue::Missing,
            Some(Repr::Number(n)) => FeatureValue::Number(n),
            Some(Repr::Text(s)) => FeatureValue::Text(s),
        })
    }
}

/// Errors raised when a record does not line up with the classifier's features.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaMismatchError {
    #[error("expected feature `{0}` is absent from the record")]
    MissingFeature(String),
    #[error("record carries feature `{0}` that the classifier was not trained on")]
    UnexpectedFeature(String),
    #[error("feature `{feature}` still holds unencoded text {value:?}")]
    UnencodedText { feature: String, value: String },
}

/// Mapping from feature name to value for a single candidate.
///
/// Storage order is irrelevant; [`assemble`](Self::assemble) rebuilds the
/// classifier's expected order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        feature: impl Into<String>,
        value: impl Into<FeatureValue>,
    ) -> Option<FeatureValue> {
        self.values.insert(feature.into(), value.into())
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.values.get(feature)
    }

    pub fn get_mut(&mut self, feature: &str) -> Option<&mut FeatureValue> {
        self.values.get_mut(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.values.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reassemble the record into the exact feature order of `expected`.
    ///
    /// Every expected feature must be present, no other feature may be, and
    /// every value must be numeric (missing values become NaN).
    pub fn assemble(&self, expected: &[String]) -> Result<Array1<f32>, SchemaMismatchError> {
        if let Some(extra) = self.values.keys().find(|k| !expected.contains(k)) {
            return Err(SchemaMismatchError::UnexpectedFeature(extra.clone()));
        }

        expected
            .iter()
            .map(|feature| {
                let value = self
                    .values
                    .get(feature)
                    .ok_or_else(|| SchemaMismatchError::MissingFeature(feature.clone()))?;
                value
                    .as_f32()
                    .ok_or_else(|| SchemaMismatchError::UnencodedText {
                        feature: feature.clone(),
                        value: value.as_text().unwrap_or_default().to_string(),
                    })
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<FeatureValue>> FromIterator<(K, V)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nan_counts_as_missing() {
        assert!(FeatureValue::Missing.is_missing());
        assert!(FeatureValue::Number(f64::NAN).is_missing());
        assert!(!FeatureValue::Number(0.0).is_missing());
        assert!(!FeatureValue::Text(String::new()).is_missing());
    }

    #[test]
    fn assemble_follows_expected_order() {
        let mut record = FeatureRecord::new();
        record.insert("koi_depth", 250.0);
        record.insert("koi_period", 3.5);
        record.insert("kepoi_name", FeatureValue::Code(4));
        record.insert("koi_score", FeatureValue::Missing);

        let row = record
            .assemble(&names(&["koi_period", "kepoi_name", "koi_depth", "koi_score"]))
            .unwrap();
        assert_eq!(row[0], 3.5);
        assert_eq!(row[1], 4.0);
        assert_eq!(row[2], 250.0);
        assert!(row[3].is_nan());
    }

    #[test]
    fn assemble_reports_schema_mismatches() {
        let record: FeatureRecord = [("koi_period", 1.0)].into_iter().collect();

        assert_eq!(
            record.assemble(&names(&["koi_period", "koi_depth"])),
            Err(SchemaMismatchError::MissingFeature("koi_depth".into()))
        );
        assert_eq!(
            record.assemble(&names(&[])),
            Err(SchemaMismatchError::UnexpectedFeature("koi_period".into()))
        );

        let text: FeatureRecord = [("kepoi_name", "K00752.01")].into_iter().collect();
        assert_eq!(
            text.assemble(&names(&["kepoi_name"])),
            Err(SchemaMismatchError::UnencodedText {
                feature: "kepoi_name".into(),
                value: "K00752.01".into()
            })
        );
    }

    #[test]
    fn json_round_trip_maps_null_to_missing() {
        let record: FeatureRecord = serde_json::from_value(json!({
            "koi_period": 10.5,
            "kepoi_name": "K00752.01",
            "koi_score": null
        }))
        .unwrap();

        assert_eq!(record.get("koi_period"), Some(&FeatureValue::Number(10.5)));
        assert_eq!(
            record.get("kepoi_name"),
            Some(&FeatureValue::Text("K00752.01".into()))
        );
        assert_eq!(record.get("koi_score"), Some(&FeatureValue::Missing));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["koi_score"], serde_json::Value::Null);
    }
}
