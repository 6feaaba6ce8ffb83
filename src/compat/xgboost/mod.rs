//! XGBoost JSON model format support.
//!
//! This module provides parsing of XGBoost's JSON model format and conversion
//! to the native [`Forest`](crate::repr::gbdt::Forest) and
//! [`GbdtClassifier`](crate::model::GbdtClassifier) types.

mod convert;
mod json;

pub use convert::ConversionError;
pub use json::*;
