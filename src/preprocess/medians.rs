//! Per-feature median values used for pre-fill and imputation.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::record::{FeatureRecord, FeatureValue};

/// Feature name to median.
///
/// Loaded from `{feature: number | null}`; null entries come from all-null
/// training columns and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<f64>>")]
pub struct MedianTable {
    medians: BTreeMap<String, f64>,
}

impl MedianTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, median: f64) {
        self.medians.insert(feature.into(), median);
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.medians.get(feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.medians.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.medians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medians.is_empty()
    }
}

impl From<BTreeMap<String, Option<f64>>> for MedianTable {
    fn from(raw: BTreeMap<String, Option<f64>>) -> Self {
        let medians = raw
            .into_iter()
            .filter_map(|(feature, median)| match median {
                Some(m) if !m.is_nan() => Some((feature, m)),
                _ => {
                    tracing::warn!(feature = %feature, "median is null, dropping entry");
                    None
                }
            })
            .collect();
        Self { medians }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MedianTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            medians: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Fill every missing value in `record` that has a median.
///
/// Returns the number of values filled. Present values are never touched.
pub fn impute_record(record: &mut FeatureRecord, medians: &MedianTable) -> usize {
    let mut filled = 0;
    for (feature, median) in medians.iter() {
        if let Some(value) = record.get_mut(feature) {
            if value.is_missing() {
                tracing::trace!(feature, median, "imputed missing value");
                *value = FeatureValue::Number(median);
                filled += 1;
            }
        }
    }
    filled
}
