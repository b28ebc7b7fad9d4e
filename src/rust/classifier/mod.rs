mod error;
pub mod artifact;
mod vectorizer;
mod model;
mod classifier;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use artifact::{Artifact, EstimatorSpec, MultiClass, Norm, VectorizerSpec};
pub use model::{Probabilities, TextClassifier};
pub use classifier::Classifier;
pub use builder::ClassifierBuilder;

/// Information about a loaded classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path of the artifact file, if the classifier was loaded from disk
    pub artifact_path: Option<String>,
    /// Number of classes the classifier predicts
    pub num_classes: usize,
    /// Labels of the classes, in class order
    pub class_labels: Vec<String>,
    /// Number of bag-of-words features
    pub vocabulary_size: usize,
    /// Estimator family the artifact was exported from
    pub estimator: String,
}
