use ndarray::Array1;

pub(crate) fn normalize_vector(vec: &Array1<f64>) -> Array1<f64> {
    let norm: f64 = vec.iter().map(|&x| x * x).sum::<f64>().sqrt();
    if norm > 1e-10 {
        vec / norm
    } else {
        Array1::zeros(vec.len())
    }
}

/// Numerically stable softmax: the maximum is subtracted before exponentiation.
pub(crate) fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp = scores.mapv(|s| (s - max).exp());
    let sum = exp.sum();
    exp / sum
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// One-vs-rest normalisation: independent sigmoids rescaled to sum to one.
pub(crate) fn ovr_normalize(scores: &Array1<f64>) -> Array1<f64> {
    let probs = scores.mapv(sigmoid);
    let sum = probs.sum();
    if sum > 0.0 {
        probs / sum
    } else {
        Array1::from_elem(scores.len(), 1.0 / scores.len() as f64)
    }
}

/// Index of the largest value. Ties resolve to the first index.
pub(crate) fn argmax(values: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
