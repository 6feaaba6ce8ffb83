//! Categorical label encoders.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::record::{FeatureRecord, FeatureValue};

/// Maps a categorical token to its integer code.
///
/// Classes are kept in their trained order; the code of a class is its index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "EncoderRepr")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

/// A class list appearing more than once in an encoder's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate class {0:?} in encoder vocabulary")]
pub struct DuplicateClass(pub String);

impl LabelEncoder {
    pub fn from_classes<I, S>(classes: I) -> Result<Self, DuplicateClass>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), code as u32).is_some() {
                return Err(DuplicateClass(class.clone()));
            }
        }
        Ok(Self { classes, index })
    }

    /// Code for `token`, or `None` if it is outside the vocabulary.
    pub fn transform(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Accepts both `["a", "b"]` and `{"classes": ["a", "b"]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EncoderRepr {
    List(Vec<String>),
    Object { classes: Vec<String> },
}

impl TryFrom<EncoderRepr> for LabelEncoder {
    type Error = DuplicateClass;

    fn try_from(repr: EncoderRepr) -> Result<Self, Self::Error> {
        match repr {
            EncoderRepr::List(classes) | EncoderRepr::Object { classes } => {
                LabelEncoder::from_classes(classes)
            }
        }
    }
}

/// Feature name to encoder. Presence here marks a feature as categorical.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(feature.into(), encoder);
    }

    pub fn get(&self, feature: &str) -> Option<&LabelEncoder> {
        self.encoders.get(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.encoders.contains_key(feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelEncoder)> {
        self.encoders.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl FromIterator<(String, LabelEncoder)> for EncoderTable {
    fn from_iter<I: IntoIterator<Item = (String, LabelEncoder)>>(iter: I) -> Self {
        Self {
            encoders: iter.into_iter().collect(),
        }
    }
}

/// A categorical value outside the trained vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value {value:?} for categorical feature `{feature}` is not in the trained vocabulary")]
pub struct EncodingError {
    pub feature: String,
    pub value: String,
}

/// Replace every categorical value in `record` with its integer code.
///
/// Features without an encoder are left alone. Already encoded values are
/// skipped, so encoding twice is harmless.
pub fn encode_record(record: &mut FeatureRecord, encoders: &EncoderTable) -> Result<(), EncodingError> {
    for (feature, encoder) in encoders.iter() {
        let Some(value) = record.get_mut(feature) else {
            continue;
        };
        let token = match value {
            FeatureValue::Code(_) => continue,
            FeatureValue::Text(text) => text.clone(),
            FeatureValue::Missing => String::new(),
            FeatureValue::Number(n) => number_token(*n),
        };
        let code = encoder.transform(&token).ok_or_else(|| EncodingError {
            feature: feature.to_string(),
            value: token.clone(),
        })?;
        tracing::trace!(feature, token = %token, code, "encoded categorical value");
        *value = FeatureValue::Code(code);
    }
    Ok(())
}

/// Token for a number fed to a text encoder, spelled the way the training
/// columns were stringified: `3.0`, `0.25`, `1e-05`, `1.5e+16`, `nan`.
///
/// Shortest round-trip digits, positional for decimal exponents in
/// `[-4, 16)` and scientific with a signed two-digit exponent otherwise.
fn number_token(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n == f64::INFINITY {
        return "inf".to_string();
    }
    if n == f64::NEG_INFINITY {
        return "-inf".to_string();
    }

    let scientific = format!("{n:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let positional = n.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> EncoderTable {
        [(
            "koi_pdisposition".to_string(),
            LabelEncoder::from_classes(["CANDIDATE", "FALSE POSITIVE"]).unwrap(),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn code_is_class_position() {
        let enc = LabelEncoder::from_classes(["", "a", "b"]).unwrap();
        assert_eq!(enc.transform(""), Some(0));
        assert_eq!(enc.transform("b"), Some(2));
        assert_eq!(enc.transform("c"), None);
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn duplicate_classes_rejected() {
        assert_eq!(
            LabelEncoder::from_classes(["x", "y", "x"]),
            Err(DuplicateClass("x".into()))
        );
    }

    #[test]
    fn deserializes_both_layouts() {
        let table: EncoderTable = serde_json::from_value(json!({
            "kepoi_name": ["K1", "K2"],
            "koi_pdisposition": {"classes": ["CANDIDATE", "FALSE POSITIVE"]}
        }))
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("kepoi_name").unwrap().transform("K2"), Some(1));
        assert_eq!(
            table.get("koi_pdisposition").unwrap().classes(),
            &["CANDIDATE", "FALSE POSITIVE"]
        );

        let dup = serde_json::from_value::<EncoderTable>(json!({"f": ["a", "a"]}));
        assert!(dup.is_err());
    }

    #[test]
    fn encode_replaces_known_tokens() {
        let mut record = FeatureRecord::new();
        record.insert("koi_pdisposition", "FALSE POSITIVE");
        record.insert("koi_period", 3.0);

        encode_record(&mut record, &table()).unwrap();
        assert_eq!(record.get("koi_pdisposition"), Some(&FeatureValue::Code(1)));
        assert_eq!(record.get("koi_period"), Some(&FeatureValue::Number(3.0)));

        // already encoded
        encode_record(&mut record, &table()).unwrap();
        assert_eq!(record.get("koi_pdisposition"), Some(&FeatureValue::Code(1)));
    }

    #[test]
    fn unknown_token_is_an_error() {
        let mut record = FeatureRecord::new();
        record.insert("koi_pdisposition", "MAYBE");
        let err = encode_record(&mut record, &table()).unwrap_err();
        assert_eq!(err.feature, "koi_pdisposition");
        assert_eq!(err.value, "MAYBE");
        assert!(err.to_string().contains("not in the trained vocabulary"));
    }

    #[test]
    fn missing_and_numeric_values_use_string_tokens() {
        let encoders: EncoderTable = [(
            "koi_fpflag_nt".to_string(),
            LabelEncoder::from_classes(["", "0.0", "1.0", "nan"]).unwrap(),
        )]
        .into_iter()
        .collect();

        for (value, code) in [
            (FeatureValue::Missing, 0),
            (FeatureValue::Number(0.0), 1),
            (FeatureValue::Number(1.0), 2),
            (FeatureValue::Number(f64::NAN), 3),
        ] {
            let mut record = FeatureRecord::new();
            record.insert("koi_fpflag_nt", value);
            encode_record(&mut record, &encoders).unwrap();
            assert_eq!(record.get("koi_fpflag_nt"), Some(&FeatureValue::Code(code)));
        }
    }

    #[test]
    fn number_tokens() {
        assert_eq!(number_token(3.0), "3.0");
        assert_eq!(number_token(-2.0), "-2.0");
        assert_eq!(number_token(0.25), "0.25");
        assert_eq!(number_token(f64::NAN), "nan");
        assert_eq!(number_token(f64::NEG_INFINITY), "-inf");
        assert_eq!(number_token(0.0001), "0.0001");
        assert_eq!(number_token(123456.5), "123456.5");
        assert_eq!(number_token(1e15), "1000000000000000.0");
    }

    #[test]
    fn number_tokens_switch_to_exponent_form() {
        assert_eq!(number_token(1e-5), "1e-05");
        assert_eq!(number_token(-1.5e-7), "-1.5e-07");
        assert_eq!(number_token(1e16), "1e+16");
        assert_eq!(number_token(1.2345e20), "1.2345e+20");
        assert_eq!(number_token(2.5e-300), "2.5e-300");
    }
}
