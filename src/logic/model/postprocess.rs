//! Output Postprocessing - scores -> best label

/// Tolerance when deciding whether scores already sum to 1
const DISTRIBUTION_EPSILON: f32 = 1e-3;

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|v| v / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

/// True if every value is in [0,1] and they sum to ~1
pub fn is_probability_distribution(values: &[f32]) -> bool {
    if values.is_empty() {
        return false;
    }
    let in_range = values.iter().all(|v| (0.0..=1.0).contains(v));
    let sum: f32 = values.iter().sum();
    in_range && (sum - 1.0).abs() <= DISTRIBUTION_EPSILON
}

/// Convert raw model output to probabilities.
/// `apply_softmax`: Some(flag) forces the choice, None auto-detects.
pub fn to_probabilities(raw: &[f32], apply_softmax: Option<bool>) -> Vec<f32> {
    let needs_softmax = apply_softmax.unwrap_or_else(|| !is_probability_distribution(raw));
    if needs_softmax {
        softmax(raw)
    } else {
        raw.to_vec()
    }
}

/// Argmax, NaN entries ignored. Confidence clamped to [0,1].
pub fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, v)| (i, v.clamp(0.0, 1.0)))
}

/// Label for a class index, `class_{idx}` when the manifest has none
pub fn label_for(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[2.0, 1.0, 0.1]);
        let sum: f32 = probs.iter().sum();

        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_distribution_detection() {
        assert!(is_probability_distribution(&[0.2, 0.3, 0.5]));
        assert!(!is_probability_distribution(&[3.2, -1.0, 0.4]));
        assert!(!is_probability_distribution(&[0.2, 0.2]));
        assert!(!is_probability_distribution(&[]));
    }

    #[test]
    fn test_to_probabilities_auto() {
        let already = to_probabilities(&[0.1, 0.9], None);
        assert_eq!(already, vec![0.1, 0.9]);

        let logits = to_probabilities(&[4.0, 1.0], None);
        assert!(logits[0] > 0.9);
    }

    #[test]
    fn test_to_probabilities_forced() {
        let forced = to_probabilities(&[0.5, 0.5], Some(true));
        assert!((forced[0] - 0.5).abs() < 1e-6);

        let raw = to_probabilities(&[3.0, 1.0], Some(false));
        assert_eq!(raw, vec![3.0, 1.0]);
    }

    #[test]
    fn test_best_class() {
        assert_eq!(best_class(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(best_class(&[f32::NAN, 0.3]), Some((1, 0.3)));
        assert_eq!(best_class(&[]), None);
        // ties keep the first index
        assert_eq!(best_class(&[0.5, 0.5]), Some((0, 0.5)));
    }

    #[test]
    fn test_best_class_clamps() {
        assert_eq!(best_class(&[3.0, 1.0]), Some((0, 1.0)));
    }

    #[test]
    fn test_label_fallback() {
        let labels = vec!["Fantasy".to_string()];
        assert_eq!(label_for(&labels, 0), "Fantasy");
        assert_eq!(label_for(&labels, 4), "class_4");
    }
}
