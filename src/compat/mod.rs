//! Loading models trained by external frameworks.
//!
//! Currently only XGBoost's JSON model format is supported; see [`xgboost`].

pub mod xgboost;

pub use xgboost::{ConversionError, XgbModel};
