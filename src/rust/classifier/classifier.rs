use std::sync::Arc;

use ndarray::{Array1, Array2};

use super::artifact::{Artifact, EstimatorSpec, MultiClass};
use super::error::ClassifierError;
use super::model::{Probabilities, TextClassifier};
use super::utils::{ovr_normalize, sigmoid, softmax};
use super::vectorizer::Vectorizer;

/// How decision scores become probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// Softmax over one score per class (multinomial logistic regression, naive Bayes)
    Softmax,
    /// Independent sigmoids renormalised to sum to one
    OneVsRest,
    /// Single decision row, softmax over `[-d, d]`
    BinarySoftmax,
    /// Single decision row, `[1 - σ(d), σ(d)]`
    BinarySigmoid,
}

/// A linear bag-of-words text classifier loaded from a portable artifact.
///
/// # Thread Safety
///
/// The classifier is immutable once built, and every field is `Send + Sync`, so it can
/// be shared across threads behind an `Arc`.
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use emotion_classifier::{Classifier, TextClassifier};
///
/// let classifier = Classifier::builder()
///     .with_artifact_path("models/emotion_detection.json")?
///     .build()?;
///
/// let (label, probabilities) = classifier.classify("I am very happy today!")?;
/// println!("{}: {:?}", label, probabilities);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Classifier {
    pub artifact_path: Option<String>,
    labels: Arc<Vec<String>>,
    vectorizer: Arc<Vectorizer>,
    coef: Arc<Array2<f64>>,
    intercept: Arc<Array1<f64>>,
    link: Link,
    estimator_kind: &'static str,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Builds a classifier from an in-memory artifact, validating it first.
    pub fn from_artifact(artifact: Artifact) -> Result<Self, ClassifierError> {
        artifact.validate()?;
        Self::from_parts(artifact, None)
    }

    /// Builds a classifier from an artifact that has already passed `validate`.
    pub(crate) fn from_parts(
        artifact: Artifact,
        artifact_path: Option<String>,
    ) -> Result<Self, ClassifierError> {
        let vectorizer = Vectorizer::from_spec(&artifact.vectorizer)?;
        let coef_rows = artifact.estimator.coef();
        let rows = coef_rows.len();
        let cols = artifact.num_features();
        let coef = Array2::from_shape_vec((rows, cols), coef_rows.concat()).map_err(|e| {
            ClassifierError::InvalidArtifact(format!("Bad coefficient shape: {}", e))
        })?;
        let intercept = Array1::from(artifact.estimator.intercept().to_vec());

        let link = match (&artifact.estimator, rows) {
            (
                EstimatorSpec::LogisticRegression {
                    multi_class: Some(MultiClass::Multinomial),
                    ..
                },
                1,
            ) => Link::BinarySoftmax,
            (EstimatorSpec::LogisticRegression { .. }, 1) => Link::BinarySigmoid,
            (
                EstimatorSpec::LogisticRegression {
                    multi_class: Some(MultiClass::Ovr),
                    ..
                },
                _,
            ) => Link::OneVsRest,
            _ => Link::Softmax,
        };

        Ok(Self {
            artifact_path,
            estimator_kind: artifact.estimator.kind(),
            labels: Arc::new(artifact.labels),
            vectorizer: Arc::new(vectorizer),
            coef: Arc::new(coef),
            intercept: Arc::new(intercept),
            link,
        })
    }

    /// Returns information about the loaded artifact
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            artifact_path: self.artifact_path.clone(),
            num_classes: self.labels.len(),
            class_labels: self.labels.to_vec(),
            vocabulary_size: self.vectorizer.num_features(),
            estimator: self.estimator_kind.to_string(),
        }
    }

    /// Raw decision scores, one per coefficient row.
    fn decision_function(&self, text: &str) -> Array1<f64> {
        let features = self.vectorizer.transform(text);
        self.coef.dot(&features) + &*self.intercept
    }
}

impl TextClassifier for Classifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict_probabilities(&self, text: &str) -> Result<Probabilities, ClassifierError> {
        let scores = self.decision_function(text);
        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(ClassifierError::Prediction(format!(
                "Model produced a non-finite decision score ({})",
                bad
            )));
        }

        let probs = match self.link {
            Link::Softmax => softmax(&scores),
            Link::OneVsRest => ovr_normalize(&scores),
            Link::BinarySoftmax => softmax(&Array1::from(vec![-scores[0], scores[0]])),
            Link::BinarySigmoid => {
                let p = sigmoid(scores[0]);
                Array1::from(vec![1.0 - p, p])
            }
        };

        Ok(self
            .labels
            .iter()
            .cloned()
            .zip(probs.iter().copied())
            .collect())
    }
}
