// ============================================================
// Layer 5 — Logit Rescaler (classifier weight re-scaling)
// ============================================================
// A classifier trained on a long-tailed set learns larger weight
// vectors for frequent classes. At evaluation time each class's
// weight row is divided by a factor that shrinks with the class's
// training frequency:
//
//   n(i) = count(i) / max(count)       n in (0, 1], n(0) = 1
//   s(i) = n(i)^p                      p = rescaling strength
//   W'[i] = W[i] / s(i)
//
// Rare classes get s(i) < 1, so their rows grow and their logits
// are boosted. Biases are left untouched.
//
// This is a pure function: it returns a new matrix and never
// touches its input. Apply it once per evaluation; feeding the
// output back in compounds the correction.

use crate::domain::{
    error::TrainError, frequency::ClassFrequencyProfile, weights::WeightMatrix,
};

/// Floor for s(i); classes with no training samples would
/// otherwise divide by zero.
pub const MIN_SCALE: f64 = 1e-8;

/// Per-class divisors s(i) for the given profile and strength.
pub fn class_scales(profile: &ClassFrequencyProfile, strength: f64) -> Result<Vec<f64>, TrainError> {
    if !strength.is_finite() {
        return Err(TrainError::config(format!("rescaling strength must be finite, got {strength}")));
    }
    let max = profile.max_count().ok_or_else(|| {
        TrainError::config("cannot rescale: every class has zero training samples")
    })?;
    Ok(profile
        .counts()
        .iter()
        .map(|&count| (count / max).powf(strength).max(MIN_SCALE))
        .collect())
}

/// Divide each class row of `weights` by its scale factor.
pub fn rescale(
    weights: &WeightMatrix,
    profile: &ClassFrequencyProfile,
    strength: f64,
) -> Result<WeightMatrix, TrainError> {
    if weights.rows() != profile.num_classes() {
        return Err(TrainError::Shape {
            expected: format!("{} class rows", profile.num_classes()),
            found: format!("{} rows", weights.rows()),
        });
    }

    let scales = class_scales(profile, strength)?;
    let mut out = weights.clone();
    for (class, scale) in scales.iter().enumerate() {
        for w in out.row_mut(class) {
            *w = (*w as f64 / scale) as f32;
        }
    }

    tracing::debug!(
        "Rescaled {} classes with strength {} (s_min = {:.6})",
        scales.len(),
        strength,
        scales.iter().copied().fold(f64::INFINITY, f64::min),
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn non_finite_strength_is_rejected() {
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 100.0).unwrap();
        for strength in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = rescale(&ones(10, 4), &profile, strength).unwrap_err();
            assert!(matches!(err, TrainError::Config(_)));
        }
    }

    fn ones(rows: usize, cols: usize) -> WeightMatrix {
        WeightMatrix::from_rows(rows, cols, vec![1.0; rows * cols]).unwrap()
    }

    #[test]
    fn head_class_unchanged_tail_class_amplified() {
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 100.0).unwrap();
        let weights = ones(10, 4);
        let out = rescale(&weights, &profile, 1.0).unwrap();

        assert_eq!(out.row(0), weights.row(0));
        // s(9) = 0.01 → weights scaled up 100x
        for &w in out.row(9) {
            assert_relative_eq!(w, 100.0, max_relative = 1e-5);
        }
        for class in 1..10 {
            assert!(out.row(class)[0] > out.row(class - 1)[0]);
        }
    }

    #[test]
    fn strength_zero_is_identity() {
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 100.0).unwrap();
        let weights = WeightMatrix::from_rows(10, 2, (0..20).map(|v| v as f32).collect()).unwrap();
        let out = rescale(&weights, &profile, 0.0).unwrap();
        assert_eq!(out, weights);
    }

    #[test]
    fn pure_and_deterministic() {
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 50.0).unwrap();
        let weights = WeightMatrix::from_rows(10, 3, (0..30).map(|v| v as f32 * 0.37 - 4.0).collect()).unwrap();
        let before = weights.clone();

        let a = rescale(&weights, &profile, 0.1).unwrap();
        let b = rescale(&weights, &profile, 0.1).unwrap();

        assert_eq!(weights, before);
        let a_bits: Vec<u32> = a.as_slice().iter().map(|w| w.to_bits()).collect();
        let b_bits: Vec<u32> = b.as_slice().iter().map(|w| w.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn zero_count_class_is_clamped_not_infinite() {
        let profile = ClassFrequencyProfile::from_counts(vec![100.0, 10.0, 0.0]).unwrap();
        let out = rescale(&ones(3, 2), &profile, 1.0).unwrap();
        assert!(out.as_slice().iter().all(|w| w.is_finite()));
        assert_relative_eq!(out.row(2)[0], (1.0 / MIN_SCALE) as f32, max_relative = 1e-5);
    }

    #[test]
    fn all_empty_profile_is_rejected() {
        let profile = ClassFrequencyProfile::from_counts(vec![0.0, 0.0]).unwrap();
        assert!(rescale(&ones(2, 2), &profile, 1.0).is_err());
    }

    #[test]
    fn class_count_mismatch_is_rejected() {
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 10.0).unwrap();
        let err = rescale(&ones(100, 2), &profile, 1.0).unwrap_err();
        assert!(matches!(err, TrainError::Shape { .. }));
    }
}
