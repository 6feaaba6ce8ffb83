//! Form rendering and record collection against the fixture artifacts.

mod common;

use koi_predict::collector::{INSTRUCTIONS, TITLE};
use koi_predict::{
    CollectError, EncodingError, FeatureValue, FieldKind, Label, MissingMedianPolicy, PredictError,
};

use common::koi_store;

#[test]
fn form_has_one_field_per_expected_feature() {
    let store = koi_store();
    let form = store.input_form(MissingMedianPolicy::Strict).unwrap();

    assert_eq!(form.title(), TITLE);
    assert_eq!(form.instructions(), INSTRUCTIONS);

    let names: Vec<_> = form.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["koi_pdisposition", "koi_period", "koi_depth", "koi_prad"]);

    let disposition = form.field("koi_pdisposition").unwrap();
    assert_eq!(disposition.kind, FieldKind::Text);
    assert_eq!(disposition.label, "Disposition Using Kepler Data (categorical)");

    let period = form.field("koi_period").unwrap();
    assert_eq!(period.kind, FieldKind::Number { default: 10.5 });
    assert_eq!(period.label, "Orbital Period [days]");
}

#[test]
fn collected_defaults_predict() {
    let store = koi_store();
    let form = store.input_form(MissingMedianPolicy::Zero).unwrap();

    let record = form.collect([("koi_pdisposition", "CANDIDATE")]).unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(record.get("koi_prad"), Some(&FeatureValue::Number(2.2)));

    // defaults route left in both trees: 1.5 + 0.8
    let verdict = store.predict(record).unwrap();
    assert_eq!(verdict.label, Label::Positive);
    assert_eq!(
        verdict.message(),
        "This candidate is predicted to be an EXOPLANET! (Confidence: 0.91)"
    );
}

#[test]
fn blank_categorical_is_rejected_by_the_encoder() {
    let store = koi_store();
    let form = store.input_form(MissingMedianPolicy::Zero).unwrap();

    // "" is not among the trained classes
    let record = form.collect([("koi_period", "12")]).unwrap();
    let err = store.predict(record).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn padded_categorical_token_is_not_in_vocabulary() {
    let store = koi_store();
    let form = store.input_form(MissingMedianPolicy::Zero).unwrap();

    let record = form.collect([("koi_pdisposition", "CANDIDATE ")]).unwrap();
    let err = store.predict(record).unwrap_err();
    assert_eq!(
        err,
        PredictError::Encoding(EncodingError {
            feature: "koi_pdisposition".into(),
            value: "CANDIDATE ".into(),
        })
    );
}

#[test]
fn invalid_number_is_rejected() {
    let store = koi_store();
    let form = store.input_form(MissingMedianPolicy::Zero).unwrap();

    assert_eq!(
        form.collect([("koi_depth", "deep")]),
        Err(CollectError::InvalidNumber {
            feature: "koi_depth".into(),
            value: "deep".into()
        })
    );
}
