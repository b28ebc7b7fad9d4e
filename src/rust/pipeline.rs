//! Load, preprocess, predict: one invocation of the classifier.

use std::fmt;
use std::path::PathBuf;

use log::{error, info, warn};

use crate::classifier::{Classifier, ClassifierError, TextClassifier};
use crate::model_manager::ModelManager;
use crate::preprocess::Preprocessor;
use crate::response::{ErrorResponse, LabelsResponse, PredictionResult};

/// Environment variable naming the artifact file to load.
pub const MODEL_ENV: &str = "EMOTION_CLASSIFIER_MODEL";

/// Failure categories, each with its own process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    ArtifactLoad,
    Prediction,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::ArtifactLoad => 1,
            Self::Usage => 2,
            Self::Prediction => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::ArtifactLoad => "artifact_load",
            Self::Prediction => "prediction",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message.clone(),
            kind: self.kind.as_str(),
        }
    }
}

impl From<ClassifierError> for PipelineError {
    fn from(err: ClassifierError) -> Self {
        if err.is_load_error() {
            Self::new(ErrorKind::ArtifactLoad, format!("Failed to load model: {}", err))
        } else {
            Self::new(ErrorKind::Prediction, err.to_string())
        }
    }
}

/// Per-invocation settings, usually filled from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Artifact to load; falls back to the managed models directory
    pub model_path: Option<PathBuf>,
    /// Expected SHA-256 of the artifact, overriding any sidecar
    pub sha256: Option<String>,
    pub preprocess: bool,
    pub keep_stopwords: bool,
}

impl Options {
    pub fn artifact_path(&self) -> PathBuf {
        ModelManager::new_default().resolve(self.model_path.as_deref())
    }

    fn preprocessor(&self) -> Option<Preprocessor> {
        self.preprocess
            .then(|| Preprocessor::default().with_remove_stopwords(!self.keep_stopwords))
    }
}

/// Loads the classifier named by `options`.
pub fn load(options: &Options) -> Result<Classifier, PipelineError> {
    let path = options.artifact_path();
    let mut builder = Classifier::builder().with_artifact_path(&path)?;
    if let Some(digest) = &options.sha256 {
        builder = builder.with_expected_sha256(digest.clone());
    }
    builder.build().map_err(|err| {
        error!("Error loading model from {:?}: {}", path, err);
        PipelineError::from(err)
    })
}

/// Runs preprocessing and prediction against an already loaded classifier.
pub fn predict_with<C: TextClassifier + ?Sized>(
    classifier: &C,
    text: &str,
    options: &Options,
) -> Result<PredictionResult, PipelineError> {
    let processed = options.preprocessor().map(|p| p.process(text));
    let input = processed.as_deref().unwrap_or(text);

    let (prediction, probabilities) = classifier.classify(input).map_err(|err| {
        warn!("Prediction failed: {}", err);
        PipelineError::new(ErrorKind::Prediction, err.to_string())
    })?;
    info!("Predicted '{}'", prediction);

    Ok(PredictionResult {
        prediction,
        probabilities,
        original_text: processed.as_ref().map(|_| text.to_string()),
        processed_text: processed,
    })
}

/// Loads the artifact and classifies `text`.
pub fn run(text: &str, options: &Options) -> Result<PredictionResult, PipelineError> {
    let classifier = load(options)?;
    predict_with(&classifier, text, options)
}

/// Loads the artifact and reports its label set, in class order.
pub fn list_labels(options: &Options) -> Result<LabelsResponse, PipelineError> {
    let classifier = load(options)?;
    Ok(LabelsResponse::new(classifier.labels().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Probabilities;

    struct Echo;

    impl TextClassifier for Echo {
        fn labels(&self) -> &[String] {
            &[]
        }

        fn predict_probabilities(&self, text: &str) -> Result<Probabilities, ClassifierError> {
            if text.contains("boom") {
                return Err(ClassifierError::Prediction("boom".into()));
            }
            let happy = if text.contains("happy") { 0.9 } else { 0.1 };
            Ok(vec![("joy".into(), happy), ("sadness".into(), 1.0 - happy)])
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorKind::ArtifactLoad.exit_code(), 1);
        assert_eq!(ErrorKind::Usage.exit_code(), 2);
        assert_eq!(ErrorKind::Prediction.exit_code(), 3);
    }

    #[test]
    fn test_plain_prediction_has_no_texts() {
        let result = predict_with(&Echo, "so happy", &Options::default()).unwrap();
        assert_eq!(result.prediction, "joy");
        assert!(result.original_text.is_none());
        assert!(result.processed_text.is_none());
    }

    #[test]
    fn test_preprocessing_reports_both_texts() {
        let options = Options {
            preprocess: true,
            ..Options::default()
        };
        let result = predict_with(&Echo, "@bob I am very happy", &options).unwrap();
        assert_eq!(result.original_text.as_deref(), Some("@bob I am very happy"));
        assert_eq!(result.processed_text.as_deref(), Some("happy"));

        let options = Options {
            preprocess: true,
            keep_stopwords: true,
            ..Options::default()
        };
        let result = predict_with(&Echo, "@bob I am", &options).unwrap();
        assert_eq!(result.processed_text.as_deref(), Some(" I am"));
    }

    #[test]
    fn test_prediction_failure_kind() {
        let err = predict_with(&Echo, "boom", &Options::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Prediction);
        assert_eq!(err.to_response().kind, "prediction");
    }

    #[test]
    fn test_missing_artifact_is_load_error() {
        let options = Options {
            model_path: Some(PathBuf::from("/nonexistent/emotion_detection.json")),
            ..Options::default()
        };
        let err = run("hello", &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArtifactLoad);
        assert!(err.message.starts_with("Failed to load model"));
        assert_eq!(list_labels(&options).unwrap_err().kind, ErrorKind::ArtifactLoad);
    }
}
