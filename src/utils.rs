//! Shared numeric helpers: the sigmoid pair used by every layer and the
//! temperature softmax used by the generator.

use ndarray::Array1;

use crate::error::{ModelError, Result};

// Keeps the normalizing division away from zero.
const SOFTMAX_EPS: f32 = 1e-12;

/// Standard logistic sigmoid.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative expressed in terms of the *post-activation* value:
/// for y = sigmoid(z), dy/dz = y * (1 - y). Layers cache their activated
/// outputs, so the derivative is always evaluated on those.
pub fn sigmoid_derivative(y: f32) -> f32 {
    y * (1.0 - y)
}

/// Temperature-scaled softmax over a logit vector.
///
/// Computes `exp(logits_i / temperature)` normalized to sum to 1. The
/// row maximum is subtracted before exponentiation (numerical stability;
/// the result is unchanged). Lower temperatures sharpen the distribution
/// toward the arg-max, higher temperatures flatten it toward uniform,
/// 1.0 is plain softmax.
///
/// Fails with `InvalidTemperature` when `temperature <= 0`.
pub fn softmax_with_temperature(logits: &Array1<f32>, temperature: f32) -> Result<Array1<f32>> {
    if temperature <= 0.0 {
        return Err(ModelError::InvalidTemperature(temperature));
    }

    let max_val = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut softened = logits.mapv(|x| ((x - max_val) / temperature).exp());
    let sum: f32 = softened.sum();
    softened.mapv_inplace(|x| x / sum.max(SOFTMAX_EPS));

    Ok(softened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_range() {
        for &x in &[-50.0f32, -1.0, 0.0, 1.0, 50.0] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y} out of (0,1)");
        }
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sigmoid_derivative_peaks_at_half() {
        assert!((sigmoid_derivative(0.5) - 0.25).abs() < 1e-6);
        assert!(sigmoid_derivative(0.9) < sigmoid_derivative(0.5));
        assert!(sigmoid_derivative(0.1) < sigmoid_derivative(0.5));
    }

    #[test]
    fn test_softmax_sums_to_one_and_is_positive() {
        let logits = array![1.0f32, 2.0, 3.0, -4.0];
        let probs = softmax_with_temperature(&logits, 1.0).unwrap();

        let sum: f32 = probs.sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
        for &p in probs.iter() {
            assert!(p > 0.0, "probability {p} not strictly positive");
        }
    }

    #[test]
    fn test_softmax_rejects_non_positive_temperature() {
        let logits = array![1.0f32, 2.0];
        assert!(matches!(
            softmax_with_temperature(&logits, 0.0),
            Err(ModelError::InvalidTemperature(_))
        ));
        assert!(matches!(
            softmax_with_temperature(&logits, -1.0),
            Err(ModelError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_softmax_temperature_limits() {
        let logits = array![1.0f32, 2.0, 4.0];

        // Very low temperature approaches a one-hot at the arg-max.
        let sharp = softmax_with_temperature(&logits, 0.01).unwrap();
        assert!(sharp[2] > 0.999);

        // Very high temperature approaches uniform.
        let flat = softmax_with_temperature(&logits, 1000.0).unwrap();
        for &p in flat.iter() {
            assert!((p - 1.0 / 3.0).abs() < 0.01, "not near uniform: {p}");
        }
    }

    #[test]
    fn test_softmax_stable_for_large_logits() {
        let logits = array![1000.0f32, 1001.0, 1002.0];
        let probs = softmax_with_temperature(&logits, 1.0).unwrap();
        for &p in probs.iter() {
            assert!(p.is_finite());
        }
    }
}
