//! Portable classifier artifact.
//!
//! An artifact is a JSON export of a fitted bag-of-words pipeline: a vectorizer
//! (vocabulary plus tokenisation settings) followed by a linear estimator. Both
//! logistic regression and multinomial naive Bayes reduce to `coef · x + intercept`
//! at inference time, differing only in how scores become probabilities.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Highest artifact format version this crate understands.
pub const FORMAT_VERSION: u32 = 1;

/// Token pattern used by scikit-learn's `CountVectorizer` when none is configured.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// A deserialized classifier artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Class labels in the estimator's internal order
    pub labels: Vec<String>,
    pub vectorizer: VectorizerSpec,
    pub estimator: EstimatorSpec,
}

/// Settings of the text vectorizer the estimator was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Term to feature column
    pub vocabulary: BTreeMap<String, usize>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Clip term counts to 1
    #[serde(default)]
    pub binary: bool,
    /// Inverse document frequencies, one per feature, for tf-idf artifacts
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Option<Norm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Strategy used by logistic regression to turn decision scores into probabilities.
///
/// When an artifact leaves it out, a single coefficient row is read as one-vs-rest and
/// several rows as multinomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    Multinomial,
    Ovr,
}

/// The fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    LogisticRegression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multi_class: Option<MultiClass>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// `coef` holds `feature_log_prob_`, `intercept` holds `class_log_prior_`
    MultinomialNb {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

impl EstimatorSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::MultinomialNb { .. } => "multinomial_nb",
        }
    }

    pub fn coef(&self) -> &[Vec<f64>] {
        match self {
            Self::LogisticRegression { coef, .. } | Self::MultinomialNb { coef, .. } => coef,
        }
    }

    pub fn intercept(&self) -> &[f64] {
        match self {
            Self::LogisticRegression { intercept, .. } | Self::MultinomialNb { intercept, .. } => {
                intercept
            }
        }
    }
}

impl Artifact {
    /// Parses and validates an artifact from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClassifierError> {
        let artifact: Artifact = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        debug!(
            "Parsed artifact: {} labels, {} features",
            artifact.labels.len(),
            artifact.num_features()
        );
        Ok(artifact)
    }

    pub fn num_features(&self) -> usize {
        self.vectorizer.vocabulary.len()
    }

    /// Checks that labels, vocabulary and weights describe one consistent model.
    ///
    /// The token pattern is compiled when the vectorizer is built.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let invalid = |msg: String| Err(ClassifierError::InvalidArtifact(msg));

        if self.format_version == 0 || self.format_version > FORMAT_VERSION {
            return invalid(format!(
                "Unsupported format version {} (max supported is {})",
                self.format_version, FORMAT_VERSION
            ));
        }

        if self.labels.len() < 2 {
            return invalid(format!(
                "Artifact must define at least 2 labels, found {}",
                self.labels.len()
            ));
        }
        let mut seen = HashSet::new();
        for label in &self.labels {
            if label.is_empty() {
                return invalid("Labels cannot be empty".into());
            }
            if !seen.insert(label.as_str()) {
                return invalid(format!("Duplicate label '{}'", label));
            }
        }

        let num_features = self.num_features();
        if num_features == 0 {
            return invalid("Vocabulary cannot be empty".into());
        }
        if let Some((term, &index)) = self
            .vectorizer
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= num_features)
        {
            return invalid(format!(
                "Vocabulary index {} for term '{}' is out of range (vocabulary size {})",
                index, term, num_features
            ));
        }
        let distinct: HashSet<usize> = self.vectorizer.vocabulary.values().copied().collect();
        if distinct.len() != num_features {
            return invalid("Vocabulary indices must be unique".into());
        }

        let (min_n, max_n) = self.vectorizer.ngram_range;
        if min_n == 0 || min_n > max_n {
            return invalid(format!("Invalid ngram range ({}, {})", min_n, max_n));
        }
        if let Some(idf) = &self.vectorizer.idf {
            if idf.len() != num_features {
                return invalid(format!(
                    "idf has {} entries, expected {}",
                    idf.len(),
                    num_features
                ));
            }
            if idf.iter().any(|v| !v.is_finite()) {
                return invalid("idf contains non-finite values".into());
            }
        }

        let coef = self.estimator.coef();
        let intercept = self.estimator.intercept();
        let num_classes = self.labels.len();
        let binary_lr = matches!(self.estimator, EstimatorSpec::LogisticRegression { .. })
            && num_classes == 2
            && coef.len() == 1;
        if coef.len() != num_classes && !binary_lr {
            return invalid(format!(
                "Estimator has {} coefficient rows for {} labels",
                coef.len(),
                num_classes
            ));
        }
        if let Some((row, width)) = coef
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, width)| *width != num_features)
        {
            return invalid(format!(
                "Coefficient row {} has {} columns, expected {}",
                row, width, num_features
            ));
        }
        if intercept.len() != coef.len() {
            return invalid(format!(
                "Estimator has {} intercepts for {} coefficient rows",
                intercept.len(),
                coef.len()
            ));
        }
        if coef.iter().flatten().chain(intercept).any(|v| !v.is_finite()) {
            return invalid("Estimator weights contain non-finite values".into());
        }

        Ok(())
    }
}
