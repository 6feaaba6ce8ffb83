//! koi-predict: exoplanet candidate classification for Kepler Objects of Interest.
//!
//! This crate loads a pre-trained gradient-boosted tree classifier exported
//! from XGBoost, together with the median and label-encoder tables used at
//! training time, and predicts whether a single KOI is a confirmed exoplanet.
//!
//! # Example
//!
//! ```ignore
//! use koi_predict::{ArtifactPaths, ArtifactStore, MissingMedianPolicy};
//!
//! let store = ArtifactStore::load(&ArtifactPaths::in_dir("artifacts"))?;
//! let form = store.input_form(MissingMedianPolicy::Zero)?;
//! let record = form.collect([("koi_period", "9.48"), ("koi_depth", "615.8")])?;
//! println!("{}", store.predict(record)?);
//! ```

pub mod artifacts;
pub mod catalog;
pub mod collector;
pub mod compat;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod repr;
pub mod testing;

pub use artifacts::{ArtifactLoadError, ArtifactPaths, ArtifactStore};
pub use collector::{CollectError, FieldKind, InputField, InputForm};
pub use config::{AppConfig, ConfigError, MissingMedianPolicy};
pub use model::{Classifier, GbdtClassifier, Label};
pub use pipeline::{predict, PredictError, Verdict};
pub use preprocess::{
    EncoderTable, EncodingError, FeatureRecord, FeatureValue, LabelEncoder, MedianTable,
    SchemaMismatchError,
};
