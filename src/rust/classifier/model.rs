use ndarray::Array1;

use super::error::ClassifierError;
use super::utils::argmax;

/// Ordered label→probability pairs, in the model's class order.
pub type Probabilities = Vec<(String, f64)>;

/// The capability a loaded artifact offers to the inference pipeline.
///
/// Implementors only have to provide [`labels`](Self::labels) and
/// [`predict_probabilities`](Self::predict_probabilities); the predicted label is the
/// most probable class, ties going to the label that comes first in class order.
pub trait TextClassifier {
    /// The fixed label set, in class order
    fn labels(&self) -> &[String];

    /// Returns one probability per label, in class order, summing to 1.
    fn predict_probabilities(&self, text: &str) -> Result<Probabilities, ClassifierError>;

    /// Returns the most probable label.
    fn predict(&self, text: &str) -> Result<String, ClassifierError> {
        self.classify(text).map(|(label, _)| label)
    }

    /// Returns both the predicted label and the full distribution from a single pass.
    fn classify(&self, text: &str) -> Result<(String, Probabilities), ClassifierError> {
        let probabilities = self.predict_probabilities(text)?;
        if let Some((label, _)) = probabilities.iter().find(|(_, p)| !p.is_finite()) {
            return Err(ClassifierError::Prediction(format!(
                "Non-finite probability for label '{}'",
                label
            )));
        }
        let values = Array1::from_iter(probabilities.iter().map(|(_, p)| *p));
        let label = argmax(&values)
            .map(|i| probabilities[i].0.clone())
            .ok_or_else(|| ClassifierError::Prediction("Model produced no probabilities".into()))?;
        Ok((label, probabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        labels: Vec<String>,
        probs: Vec<f64>,
    }

    impl TextClassifier for Fixed {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn predict_probabilities(&self, _text: &str) -> Result<Probabilities, ClassifierError> {
            Ok(self.labels.iter().cloned().zip(self.probs.iter().copied()).collect())
        }
    }

    fn fixed(probs: Vec<f64>) -> Fixed {
        Fixed {
            labels: vec!["anger".into(), "joy".into(), "fear".into()],
            probs,
        }
    }

    #[test]
    fn test_predict_is_argmax() {
        let model = fixed(vec![0.2, 0.5, 0.3]);
        assert_eq!(model.predict("anything").unwrap(), "joy");
    }

    #[test]
    fn test_ties_go_to_first_label() {
        let model = fixed(vec![0.4, 0.2, 0.4]);
        assert_eq!(model.predict("anything").unwrap(), "anger");
    }

    #[test]
    fn test_nan_is_a_prediction_error() {
        let model = fixed(vec![f64::NAN, 0.5, 0.5]);
        assert!(matches!(
            model.classify("anything"),
            Err(ClassifierError::Prediction(_))
        ));
    }

    #[test]
    fn test_empty_distribution_is_a_prediction_error() {
        let model = Fixed { labels: vec![], probs: vec![] };
        assert!(matches!(model.predict("x"), Err(ClassifierError::Prediction(_))));
    }
}
