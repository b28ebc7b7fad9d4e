use emotion_classifier::{Artifact, Classifier, ClassifierError, ModelError, ModelManager};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

fn base_artifact() -> Value {
    json!({
        "format_version": 1,
        "labels": ["joy", "sadness"],
        "vectorizer": { "vocabulary": { "happy": 0, "sad": 1 } },
        "estimator": {
            "kind": "logistic_regression",
            "coef": [[1.0, -1.0], [-1.0, 1.0]],
            "intercept": [0.0, 0.0]
        }
    })
}

fn build(value: Value) -> Result<Classifier, ClassifierError> {
    let artifact: Artifact = serde_json::from_value(value)?;
    Classifier::builder().with_artifact(artifact)?.build()
}

fn assert_invalid(value: Value) {
    let err = build(value).unwrap_err();
    assert!(
        matches!(err, ClassifierError::InvalidArtifact(_)),
        "unexpected error: {:?}",
        err
    );
    assert!(err.is_load_error());
}

#[test]
fn test_valid_artifact() {
    assert!(build(base_artifact()).is_ok());
}

#[test]
fn test_duplicate_labels() {
    let mut value = base_artifact();
    value["labels"] = json!(["joy", "joy"]);
    assert_invalid(value);
}

#[test]
fn test_single_label() {
    let mut value = base_artifact();
    value["labels"] = json!(["joy"]);
    value["estimator"]["coef"] = json!([[1.0, -1.0]]);
    value["estimator"]["intercept"] = json!([0.0]);
    assert_invalid(value);
}

#[test]
fn test_coefficient_width_mismatch() {
    let mut value = base_artifact();
    value["estimator"]["coef"] = json!([[1.0], [-1.0]]);
    assert_invalid(value);
}

#[test]
fn test_intercept_length_mismatch() {
    let mut value = base_artifact();
    value["estimator"]["intercept"] = json!([0.0]);
    assert_invalid(value);
}

#[test]
fn test_vocabulary_index_out_of_range() {
    let mut value = base_artifact();
    value["vectorizer"]["vocabulary"] = json!({ "happy": 0, "sad": 7 });
    assert_invalid(value);
}

#[test]
fn test_bad_token_pattern() {
    let mut value = base_artifact();
    value["vectorizer"]["token_pattern"] = json!("(unclosed");
    assert!(build(value).unwrap_err().is_load_error());
}

#[test]
fn test_unsupported_version() {
    let mut value = base_artifact();
    value["format_version"] = json!(99);
    assert_invalid(value);
}

#[test]
fn test_malformed_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("emotion_detection.json");
    fs::write(&path, "not json at all")?;

    let err = Classifier::builder().with_artifact_path(&path)?.build().unwrap_err();
    assert!(matches!(err, ClassifierError::Json(_)));
    Ok(())
}

#[test]
fn test_sidecar_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("emotion_detection.json");
    fs::write(&path, serde_json::to_vec(&base_artifact())?)?;
    fs::write(ModelManager::sidecar_path(&path), ModelManager::digest(b"other"))?;

    let err = Classifier::builder().with_artifact_path(&path)?.build().unwrap_err();
    assert!(matches!(err, ClassifierError::Model(ModelError::HashMismatch { .. })));
    Ok(())
}
