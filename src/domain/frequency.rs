// ============================================================
// Layer 3 — Class Frequency Profile
// ============================================================
// Per-class training sample counts, indexed by class id.
//
// The long-tailed CIFAR variants use an exponential profile:
//
//   count(i) = max_count * r^(-i / (C - 1))
//   max_count = total / C
//
// where r is the imbalance factor (most / least frequent) and
// total is the size of the balanced training set. Class 0 is the
// most frequent and counts never increase with the class index.
//
// The same profile drives both the imbalance sampler (Layer 4)
// and the classifier weight rescaling (Layer 5).

use serde::{Deserialize, Serialize};

use crate::domain::error::TrainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFrequencyProfile {
    counts: Vec<f64>,
}

impl ClassFrequencyProfile {
    /// Exponentially decaying profile over `num_classes` classes.
    pub fn exponential(
        total_samples: f64,
        num_classes: usize,
        imbalance_factor: f64,
    ) -> Result<Self, TrainError> {
        if num_classes == 0 {
            return Err(TrainError::config("class frequency profile needs at least one class"));
        }
        if imbalance_factor.is_nan() || imbalance_factor < 1.0 {
            return Err(TrainError::config(format!(
                "imbalance factor must be >= 1, got {imbalance_factor}"
            )));
        }
        if total_samples.is_nan() || total_samples <= 0.0 {
            return Err(TrainError::config(format!(
                "total sample count must be positive, got {total_samples}"
            )));
        }

        let max_count = total_samples / num_classes as f64;
        // A single class has nothing to interpolate towards.
        let span = (num_classes.max(2) - 1) as f64;
        let counts = (0..num_classes)
            .map(|i| max_count * imbalance_factor.powf(-(i as f64) / span))
            .collect();
        Self::from_counts(counts)
    }

    /// Profile from externally measured counts.
    pub fn from_counts(counts: Vec<f64>) -> Result<Self, TrainError> {
        if counts.is_empty() {
            return Err(TrainError::config("class frequency profile needs at least one class"));
        }
        if let Some(bad) = counts.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(TrainError::config(format!("invalid class count {bad}")));
        }
        Ok(Self { counts })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, class: usize) -> f64 {
        self.counts[class]
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Largest positive count, or `None` if every class is empty.
    pub fn max_count(&self) -> Option<f64> {
        self.counts
            .iter()
            .copied()
            .filter(|c| *c > 0.0)
            .fold(None, |acc, c| Some(acc.map_or(c, |m: f64| m.max(c))))
    }

    /// Counts rounded down to whole images, as used when subsampling.
    pub fn whole_counts(&self) -> Vec<usize> {
        self.counts.iter().map(|c| c.floor() as usize).collect()
    }
}
