//! Loading the trained artifacts.
//!
//! The classifier, median table and encoder table are read once at startup
//! and shared read-only afterwards. Any load failure is fatal.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::collector::{CollectError, InputForm};
use crate::compat::{ConversionError, XgbModel};
use crate::config::MissingMedianPolicy;
use crate::model::{Classifier, GbdtClassifier};
use crate::pipeline::{self, PredictError, Verdict};
use crate::preprocess::{EncoderTable, FeatureRecord, MedianTable};

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub medians: PathBuf,
    pub encoders: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("model.json"),
            medians: dir.join("medians.json"),
            encoders: dir.join("label_encoders.json"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to open artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model {}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ConversionError,
    },
}

impl ArtifactLoadError {
    /// The artifact file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            ArtifactLoadError::Io { path, .. }
            | ArtifactLoadError::Json { path, .. }
            | ArtifactLoadError::Model { path, .. } => path,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let file = File::open(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// The process-wide, immutable artifacts.
#[derive(Debug)]
pub struct ArtifactStore<C = GbdtClassifier> {
    classifier: C,
    medians: MedianTable,
    encoders: EncoderTable,
}

impl ArtifactStore<GbdtClassifier> {
    /// Load all three artifacts. The expected feature order is resolved here
    /// from the model's `feature_names`.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let model: XgbModel = read_json(&paths.model)?;
        let classifier = model
            .to_classifier()
            .map_err(|source| ArtifactLoadError::Model {
                path: paths.model.clone(),
                source,
            })?;
        let medians: MedianTable = read_json(&paths.medians)?;
        let encoders: EncoderTable = read_json(&paths.encoders)?;

        tracing::info!(
            n_features = classifier.n_features(),
            n_trees = classifier.forest().n_trees(),
            n_medians = medians.len(),
            n_encoders = encoders.len(),
            "loaded artifacts"
        );
        Ok(Self::from_parts(classifier, medians, encoders))
    }
}

impl<C: Classifier> ArtifactStore<C> {
    pub fn from_parts(classifier: C, medians: MedianTable, encoders: EncoderTable) -> Self {
        Self {
            classifier,
            medians,
            encoders,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn medians(&self) -> &MedianTable {
        &self.medians
    }

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }

    /// The form for this store's features.
    pub fn input_form(&self, policy: MissingMedianPolicy) -> Result<InputForm, CollectError> {
        InputForm::build(
            self.classifier.expected_features(),
            &self.encoders,
            &self.medians,
            policy,
        )
    }

    /// Run the pipeline on one raw record.
    pub fn predict(&self, raw: FeatureRecord) -> Result<Verdict, PredictError> {
        pipeline::predict(raw, &self.classifier, &self.medians, &self.encoders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_is_shareable() {
        assert_send_sync::<ArtifactStore>();
    }

    #[test]
    fn default_paths() {
        let paths = ArtifactPaths::in_dir("/srv/koi");
        assert_eq!(paths.model, Path::new("/srv/koi/model.json"));
        assert_eq!(paths.encoders, Path::new("/srv/koi/label_encoders.json"));
    }

    #[test]
    fn missing_file_reports_path() {
        let paths = ArtifactPaths::in_dir("/nonexistent");
        let err = ArtifactStore::load(&paths).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Io { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/model.json"));
    }
}
