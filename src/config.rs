//! Application configuration with builder pattern.
//!
//! [`AppConfig`] says where the artifacts live and how preprocessing treats
//! gaps in them. It is built with `bon` and validated at build time, or read
//! from a TOML file:
//!
//! ```toml
//! [artifacts]
//! dir = "/srv/koi"
//! model = "model.json"
//! medians = "medians.json"
//! encoders = "label_encoders.json"
//!
//! [preprocessing]
//! missing_median = "strict"
//! ```
//!
//! # Example
//!
//! ```
//! use koi_predict::config::{AppConfig, MissingMedianPolicy};
//!
//! let config = AppConfig::builder()
//!     .artifact_dir("/srv/koi")
//!     .missing_median(MissingMedianPolicy::Strict)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.artifact_paths().model, std::path::Path::new("/srv/koi/model.json"));
//! ```

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;

use crate::artifacts::ArtifactPaths;

// =============================================================================
// ConfigError
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed reading config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing TOML config")]
    Parse(#[from] toml::de::Error),

    /// An artifact file name was empty.
    #[error("{0} file name must not be empty")]
    EmptyFileName(&'static str),
}

// =============================================================================
// MissingMedianPolicy
// =============================================================================

/// What the form does for a numeric feature with no stored median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMedianPolicy {
    /// Pre-fill `0.0` and log a warning.
    #[default]
    Zero,
    /// Refuse to build the form.
    Strict,
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct AppConfig {
    /// Directory holding the artifact files. Default: current directory.
    #[builder(into, default = PathBuf::from("."))]
    pub artifact_dir: PathBuf,

    /// Default: `model.json`.
    #[builder(into, default = String::from("model.json"))]
    pub model_file: String,

    /// Default: `medians.json`.
    #[builder(into, default = String::from("medians.json"))]
    pub medians_file: String,

    /// Default: `label_encoders.json`.
    #[builder(into, default = String::from("label_encoders.json"))]
    pub encoders_file: String,

    #[builder(default)]
    pub missing_median: MissingMedianPolicy,
}

impl<S: app_config_builder::IsComplete> AppConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFileName`] if any artifact file name is empty.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("model", &self.model_file),
            ("medians", &self.medians_file),
            ("encoders", &self.encoders_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyFileName(name));
            }
        }
        Ok(())
    }

    /// Full paths of the three artifact files.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.artifact_dir.join(&self.model_file),
            medians: self.artifact_dir.join(&self.medians_file),
            encoders: self.artifact_dir.join(&self.encoders_file),
        }
    }

    /// Parse a TOML config. Absent keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(raw)?;
        let artifacts = file.artifacts.unwrap_or_default();
        let preprocessing = file.preprocessing.unwrap_or_default();

        AppConfig::builder()
            .maybe_artifact_dir(artifacts.dir)
            .maybe_model_file(artifacts.model)
            .maybe_medians_file(artifacts.medians)
            .maybe_encoders_file(artifacts.encoders)
            .maybe_missing_median(preprocessing.missing_median)
            .build()
    }

    /// Read a TOML config file.
    ///
    /// A relative `artifacts.dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        if config.artifact_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.artifact_dir = parent.join(&config.artifact_dir);
            }
        }
        tracing::debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    artifacts: Option<FileArtifactsConfig>,
    preprocessing: Option<FilePreprocessingConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileArtifactsConfig {
    dir: Option<PathBuf>,
    model: Option<String>,
    medians: Option<String>,
    encoders: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilePreprocessingConfig {
    missing_median: Option<MissingMedianPolicy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::builder().build().unwrap();
        assert_eq!(config.artifact_dir, PathBuf::from("."));
        assert_eq!(config.missing_median, MissingMedianPolicy::Zero);

        let paths = config.artifact_paths();
        assert_eq!(paths.model, Path::new("./model.json"));
        assert_eq!(paths.medians, Path::new("./medians.json"));
        assert_eq!(paths.encoders, Path::new("./label_encoders.json"));
    }

    #[test]
    fn empty_file_name_rejected() {
        let err = AppConfig::builder().medians_file("").build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyFileName("medians")));
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [artifacts]
            dir = "/srv/koi"
            encoders = "encoders.json"

            [preprocessing]
            missing_median = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/koi"));
        assert_eq!(config.model_file, "model.json");
        assert_eq!(config.encoders_file, "encoders.json");
        assert_eq!(config.missing_median, MissingMedianPolicy::Strict);
    }

    #[test]
    fn toml_unknown_keys_rejected() {
        let err = AppConfig::from_toml_str("[artifacts]\nmodle = \"x.json\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn relative_dir_resolves_against_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("koi.toml");
        std::fs::write(&path, "[artifacts]\ndir = \"artifacts\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.artifact_dir, dir.path().join("artifacts"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/koi.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
