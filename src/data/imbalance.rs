// ============================================================
// Layer 4 — Long-Tail Sampler
// ============================================================
// Turns a balanced training split into a long-tailed one.
//
// With imbalance factor r and C classes, class i keeps
//
//   floor(per_class * r^(-i / (C - 1)))
//
// images, where per_class = len / C of the balanced split.
// Which images survive is decided by a seeded Fisher-Yates
// shuffle per class, so the same seed always produces the same
// subset. The test split is never imbalanced.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::cifar::CifarImage;
use crate::domain::{error::TrainError, frequency::ClassFrequencyProfile};

/// Subsample `images` to an exponential long-tail profile.
///
/// Returns the kept images grouped by class. A factor of 1 keeps
/// every image.
pub fn long_tail(
    images: Vec<CifarImage>,
    num_classes: usize,
    imbalance_factor: f64,
    seed: u64,
) -> Result<Vec<CifarImage>, TrainError> {
    if images.is_empty() {
        return Err(TrainError::config("cannot imbalance an empty training split"));
    }

    let mut by_class: Vec<Vec<CifarImage>> = vec![Vec::new(); num_classes];
    for image in images {
        let label = image.label;
        match by_class.get_mut(label) {
            Some(bucket) => bucket.push(image),
            None => {
                return Err(TrainError::config(format!(
                    "label {label} outside 0..{num_classes}"
                )))
            }
        }
    }

    if imbalance_factor == 1.0 {
        return Ok(by_class.into_iter().flatten().collect());
    }

    let total: usize = by_class.iter().map(Vec::len).sum();
    let targets = ClassFrequencyProfile::exponential(total as f64, num_classes, imbalance_factor)?
        .whole_counts();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut kept = Vec::new();
    let mut counts = Vec::with_capacity(num_classes);
    for (class, mut bucket) in by_class.into_iter().enumerate() {
        bucket.shuffle(&mut rng);
        let n = targets[class].min(bucket.len());
        bucket.truncate(n);
        counts.push(n);
        kept.extend(bucket);
    }

    tracing::info!(
        "Imbalance factor {}: kept {} of {} training images (head {}, tail {})",
        imbalance_factor,
        kept.len(),
        total,
        counts.first().copied().unwrap_or(0),
        counts.last().copied().unwrap_or(0),
    );
    Ok(kept)
}
