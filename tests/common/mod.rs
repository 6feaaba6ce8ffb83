//! Fixture loading utilities for integration tests.
//!
//! For assertion helpers and stub classifiers, use `koi_predict::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use koi_predict::{ArtifactPaths, ArtifactStore, FeatureRecord, Label};

#[allow(unused_imports)]
pub use koi_predict::assert_approx_eq;
#[allow(unused_imports)]
pub use koi_predict::testing::{DEFAULT_TOLERANCE, MARGIN_TOLERANCE};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Base directory for test cases.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// Directory holding the KOI artifact fixtures.
pub fn koi_dir() -> PathBuf {
    test_cases_dir().join("koi")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

/// The fixture artifact store.
pub fn koi_store() -> ArtifactStore {
    ArtifactStore::load(&ArtifactPaths::in_dir(koi_dir()))
        .unwrap_or_else(|e| panic!("Failed to load fixture artifacts: {e}"))
}

// =============================================================================
// Expected Predictions
// =============================================================================

/// One hand-computed prediction for the fixture model.
#[derive(Debug, Deserialize)]
pub struct PredictionCase {
    pub name: String,
    pub record: FeatureRecord,
    /// Sum of the reached leaf values; the base margin is zero.
    pub margin: f32,
    pub label: Label,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct PredictionCases {
    cases: Vec<PredictionCase>,
}

pub fn prediction_cases() -> Vec<PredictionCase> {
    load_json::<PredictionCases>(&koi_dir().join("cases.json")).cases
}

pub fn prediction_case(name: &str) -> PredictionCase {
    prediction_cases()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no prediction case named {name}"))
}
