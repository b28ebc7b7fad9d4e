use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use super::artifact::Artifact;
use super::classifier::Classifier;
use super::error::ClassifierError;
use crate::model_manager::ModelManager;

/// Where the builder takes its artifact from.
#[derive(Debug)]
enum Source {
    Path(PathBuf),
    Artifact(Box<Artifact>),
}

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    source: Option<Source>,
    expected_sha256: Option<String>,
    skip_sidecar: bool,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance
    ///
    /// # Example
    /// ```
    /// use emotion_classifier::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the artifact file to load when the classifier is built
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The path is empty
    ///   - An artifact source is already set
    ///
    /// # Example
    /// ```
    /// use emotion_classifier::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_artifact_path("models/emotion_detection.json");
    /// assert!(builder.is_ok());
    /// ```
    pub fn with_artifact_path(mut self, path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ClassifierError::Build("Artifact path cannot be empty".to_string()));
        }
        if self.source.is_some() {
            return Err(ClassifierError::Build("Artifact source already set".to_string()));
        }
        self.source = Some(Source::Path(path.to_path_buf()));
        Ok(self)
    }

    /// Uses an already deserialized artifact instead of reading one from disk
    pub fn with_artifact(mut self, artifact: Artifact) -> Result<Self, ClassifierError> {
        if self.source.is_some() {
            return Err(ClassifierError::Build("Artifact source already set".to_string()));
        }
        self.source = Some(Source::Artifact(Box::new(artifact)));
        Ok(self)
    }

    /// Requires the artifact file to hash to `digest` (SHA-256, hex).
    ///
    /// Takes precedence over a `<artifact>.sha256` sidecar file.
    pub fn with_expected_sha256(mut self, digest: impl Into<String>) -> Self {
        self.expected_sha256 = Some(digest.into());
        self
    }

    /// Ignores any `<artifact>.sha256` sidecar next to the artifact
    pub fn skip_sidecar_verification(mut self) -> Self {
        self.skip_sidecar = true;
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No artifact source is set
    ///   - The artifact file cannot be read
    ///   - The artifact fails checksum verification
    ///   - The artifact is not valid JSON or is internally inconsistent
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let source = self.source.ok_or_else(|| {
            ClassifierError::Build("An artifact path or artifact must be set".to_string())
        })?;

        match source {
            Source::Artifact(artifact) => Classifier::from_artifact(*artifact),
            Source::Path(path) => {
                info!("Loading artifact from {:?}", path);
                let bytes = fs::read(&path).map_err(|source| {
                    error!("Failed to read artifact {:?}: {}", path, source);
                    ClassifierError::ArtifactLoad {
                        path: path.display().to_string(),
                        source,
                    }
                })?;

                let expected = match self.expected_sha256 {
                    Some(digest) => Some(digest),
                    None if self.skip_sidecar => None,
                    None => ModelManager::read_sidecar_digest(&path)?,
                };
                if let Some(expected) = expected {
                    ModelManager::verify_bytes(&path, &bytes, &expected)?;
                    info!("Artifact checksum verified");
                }

                let artifact = Artifact::from_slice(&bytes)?;
                let classifier =
                    Classifier::from_parts(artifact, Some(path.display().to_string()))?;
                let info = classifier.info();
                info!(
                    "Artifact loaded: {} labels, {} features, {}",
                    info.num_classes, info.vocabulary_size, info.estimator
                );
                Ok(classifier)
            }
        }
    }
}
