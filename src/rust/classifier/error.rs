use std::io;

use crate::model_manager::ModelError;

/// Represents the different types of errors that can occur while loading or running a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The artifact file could not be found or read
    #[error("Failed to load artifact {path}: {source}")]
    ArtifactLoad {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The artifact bytes are not a valid JSON artifact document
    #[error("Failed to parse artifact: {0}")]
    Json(#[from] serde_json::Error),
    /// The artifact parsed but its contents are inconsistent
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
    /// The artifact could not be located or failed integrity verification
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Error occurred while making predictions
    #[error("Prediction error: {0}")]
    Prediction(String),
    /// Error occurred during the build phase
    #[error("Build error: {0}")]
    Build(String),
}

impl ClassifierError {
    /// Returns true for every error raised while obtaining a usable artifact,
    /// as opposed to errors raised while running inference on one.
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::Prediction(_))
    }
}
