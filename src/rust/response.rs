use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::classifier::Probabilities;

/// The success body printed on stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    #[serde(serialize_with = "ordered_map")]
    pub probabilities: Probabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<String>,
}

/// The error body printed on stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

/// The body printed for `--labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelsResponse {
    pub labels: Vec<String>,
    pub count: usize,
}

impl LabelsResponse {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            count: labels.len(),
            labels,
        }
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// Keeps class order instead of sorting keys
fn ordered_map<S: Serializer>(pairs: &Probabilities, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (label, probability) in pairs {
        map.serialize_entry(label, probability)?;
    }
    map.end()
}

impl PredictionResult {
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ErrorResponse {
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn result(preprocessed: bool) -> PredictionResult {
        PredictionResult {
            prediction: "joy".into(),
            probabilities: vec![("sadness".into(), 0.25), ("joy".into(), 0.75)],
            original_text: preprocessed.then(|| "@a so happy".to_string()),
            processed_text: preprocessed.then(|| "happy".to_string()),
        }
    }

    #[test]
    fn test_success_body_keeps_label_order() {
        let line = result(false).to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"prediction":"joy","probabilities":{"sadness":0.25,"joy":0.75}}"#
        );
    }

    #[test]
    fn test_texts_present_only_when_preprocessing() {
        let value: Value = serde_json::from_str(&result(true).to_json_line().unwrap()).unwrap();
        assert_eq!(value["original_text"], "@a so happy");
        assert_eq!(value["processed_text"], "happy");
    }

    #[test]
    fn test_labels_body() {
        let body = LabelsResponse::new(vec!["joy".into(), "fear".into()]);
        assert_eq!(
            body.to_json_line().unwrap(),
            r#"{"labels":["joy","fear"],"count":2}"#
        );
    }

    #[test]
    fn test_error_body() {
        let body = ErrorResponse {
            error: "Please provide text as argument".into(),
            kind: "usage",
        };
        let line = body.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(
            line,
            r#"{"error":"Please provide text as argument","kind":"usage"}"#
        );
    }
}
