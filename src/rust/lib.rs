//! A deterministic emotion classifier over portable bag-of-words artifacts.
//!
//! An artifact is a JSON export of a fitted vectorizer plus a linear estimator
//! (logistic regression or multinomial naive Bayes). Loading it yields a [`Classifier`]
//! that maps text to a label and a full probability distribution.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use emotion_classifier::{Classifier, Preprocessor, TextClassifier};
//!
//! let classifier = Classifier::builder()
//!     .with_artifact_path("models/emotion_detection.json")?
//!     .build()?;
//!
//! let text = Preprocessor::default().process("@friend I am very happy today!");
//! let (label, probabilities) = classifier.classify(&text)?;
//! println!("Predicted class: {}", label);
//! for (class, p) in probabilities {
//!     println!("  {}: {:.3}", class, p);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod model_manager;
pub mod pipeline;
pub mod preprocess;
pub mod response;

pub use classifier::{
    Artifact, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, Probabilities,
    TextClassifier,
};
pub use model_manager::{ModelError, ModelManager};
pub use pipeline::{ErrorKind, Options, PipelineError};
pub use preprocess::Preprocessor;
pub use response::{ErrorResponse, LabelsResponse, PredictionResult};

/// Installs a stderr logger. Defaults to the `error` level; `RUST_LOG` overrides it.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
}
