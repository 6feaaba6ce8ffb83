//! Feature records and the stored preprocessing transforms.
//!
//! Preprocessing runs in a fixed order: categorical encoding first, then
//! median imputation. [`FeatureRecord::assemble`] then lays the record out in
//! the classifier's feature order.

mod encoder;
mod medians;
mod record;

pub use encoder::{encode_record, DuplicateClass, EncoderTable, EncodingError, LabelEncoder};
pub use medians::{impute_record, MedianTable};
pub use record::{FeatureRecord, FeatureValue, SchemaMismatchError};

/// Encode then impute `record` in place.
pub fn preprocess(
    record: &mut FeatureRecord,
    encoders: &EncoderTable,
    medians: &MedianTable,
) -> Result<(), EncodingError> {
    encode_record(record, encoders)?;
    let filled = impute_record(record, medians);
    tracing::debug!(filled, "imputed missing values");
    Ok(())
}
