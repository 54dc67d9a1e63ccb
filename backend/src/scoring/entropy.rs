//! Arithmetic behind the fakeness heuristic: a confident classifier
//! (low entropy) reads as real, a diffuse one (high entropy) as fake.

/// Numerically stable softmax. Empty input yields an empty distribution.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|&x| f64::from(x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| (e / sum) as f32).collect()
}

/// `H = -Σ p_i * ln(p_i + ε)`, accumulated in f64.
pub fn shannon_entropy(probs: &[f32], epsilon: f32) -> f32 {
    let epsilon = f64::from(epsilon);
    -probs
        .iter()
        .map(|&p| {
            let p = f64::from(p);
            p * (p + epsilon).ln()
        })
        .sum::<f64>() as f32
}

/// Maximum achievable entropy over `classes` outcomes.
pub fn max_entropy(classes: usize) -> f32 {
    (classes as f32).ln()
}

/// Entropy divided by `normalizer`, without clamping.
pub fn normalized_entropy(entropy: f32, normalizer: f32) -> f32 {
    entropy / normalizer
}

/// Final score in [0, 1].
pub fn clamp_score(raw: f32) -> f32 {
    raw.clamp(0.0, 1.0)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(scores: &[f32]) -> Option<f32> {
    if scores.is_empty() {
        return None;
    }
    let sum: f64 = scores.iter().map(|&s| f64::from(s)).sum();
    Some((sum / scores.len() as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-9;

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, -4.0]);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn uniform_distribution_normalizes_to_one() {
        let probs = softmax(&vec![0.0; 1000]);
        let entropy = shannon_entropy(&probs, EPS);
        let raw = normalized_entropy(entropy, max_entropy(1000));
        assert!((raw - 1.0).abs() < 1e-4, "raw = {}", raw);
    }

    #[test]
    fn legacy_constant_slightly_exceeds_one_for_uniform() {
        let probs = softmax(&vec![0.0; 1000]);
        let raw = normalized_entropy(shannon_entropy(&probs, EPS), 6.9);
        assert!(raw > 1.0);
        assert_eq!(clamp_score(raw), 1.0);
    }

    #[test]
    fn one_hot_distribution_normalizes_to_zero() {
        let mut probs = vec![0.0; 1000];
        probs[17] = 1.0;
        let raw = normalized_entropy(shannon_entropy(&probs, EPS), max_entropy(1000));
        assert!(raw.abs() < 1e-6, "raw = {}", raw);
        assert!(clamp_score(raw) >= 0.0);
    }

    #[test]
    fn epsilon_keeps_zero_probabilities_finite() {
        let entropy = shannon_entropy(&[0.0, 0.0, 1.0], EPS);
        assert!(entropy.is_finite());
    }

    #[test]
    fn clamp_bounds_score() {
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(0.3), 0.3);
    }

    #[test]
    fn mean_of_scores() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.4]), Some(0.4));
        let m = mean(&[0.2, 0.4, 0.9]).unwrap();
        assert!((m - 0.5).abs() < 1e-6);
    }
}
