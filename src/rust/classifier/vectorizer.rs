use std::collections::HashMap;

use ndarray::Array1;
use regex::Regex;

use super::artifact::{Norm, VectorizerSpec};
use super::error::ClassifierError;
use super::utils::normalize_vector;

/// Converts text into the dense bag-of-words feature vector the estimator was fitted on.
///
/// The analysis chain is:
/// 1. Optional lowercasing
/// 2. Token extraction with the artifact's token pattern (first capture group if the
///    pattern has one, otherwise the whole match)
/// 3. Word n-grams over the token stream, joined by a single space
/// 4. Counting of in-vocabulary terms; unknown terms are ignored
/// 5. Optional binary clipping, sublinear tf, idf weighting and row normalisation
#[derive(Debug, Clone)]
pub(crate) struct Vectorizer {
    vocabulary: HashMap<String, usize>,
    token_pattern: Regex,
    lowercase: bool,
    ngram_range: (usize, usize),
    binary: bool,
    idf: Option<Array1<f64>>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl Vectorizer {
    pub fn from_spec(spec: &VectorizerSpec) -> Result<Self, ClassifierError> {
        let token_pattern = Regex::new(&spec.token_pattern).map_err(|e| {
            ClassifierError::InvalidArtifact(format!("Token pattern does not compile: {}", e))
        })?;

        Ok(Self {
            vocabulary: spec
                .vocabulary
                .iter()
                .map(|(term, &index)| (term.clone(), index))
                .collect(),
            token_pattern,
            lowercase: spec.lowercase,
            ngram_range: spec.ngram_range,
            binary: spec.binary,
            idf: spec.idf.clone().map(Array1::from),
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
        })
    }

    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Splits text into analyzer terms (tokens and their n-grams), in document order.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let grouped = self.token_pattern.captures_len() > 1;
        let tokens: Vec<&str> = self
            .token_pattern
            .captures_iter(&text)
            .filter_map(|caps| {
                if grouped {
                    caps.get(1)
                } else {
                    caps.get(0)
                }
            })
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Builds the weighted feature vector for `text`.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut features = Array1::<f64>::zeros(self.num_features());
        for term in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                features[index] += 1.0;
            }
        }

        if self.binary {
            features.mapv_inplace(|tf| if tf > 0.0 { 1.0 } else { 0.0 });
        }
        if self.sublinear_tf {
            features.mapv_inplace(|tf| if tf > 0.0 { 1.0 + tf.ln() } else { 0.0 });
        }
        if let Some(idf) = &self.idf {
            features *= idf;
        }

        match self.norm {
            Some(Norm::L2) => normalize_vector(&features),
            Some(Norm::L1) => {
                let total: f64 = features.iter().map(|v| v.abs()).sum();
                if total > 0.0 {
                    features / total
                } else {
                    features
                }
            }
            None => features,
        }
    }
}
