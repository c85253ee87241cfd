use burn::data::dataset::Dataset;
use rand::thread_rng;

use crate::data::{augment::Augmentation, cifar::CifarImage};

/// In-memory CIFAR split.
pub struct CifarDataset {
    images: Vec<CifarImage>,
}

impl CifarDataset {
    pub fn new(images: Vec<CifarImage>) -> Self { Self { images } }

    /// Number of images per class label.
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for image in &self.images {
            if let Some(c) = counts.get_mut(image.label) {
                *c += 1;
            }
        }
        counts
    }
}

impl Dataset<CifarImage> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarImage> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}

/// Training view of a split: every `get` draws a fresh random
/// crop and flip, so each epoch sees different variants.
pub struct AugmentedDataset {
    /// Unaugmented images, never modified
    inner: CifarDataset,
    augmentation: Augmentation,
}

impl AugmentedDataset {
    pub fn new(inner: CifarDataset, augmentation: Augmentation) -> Self {
        Self { inner, augmentation }
    }
}

impl Dataset<CifarImage> for AugmentedDataset {
    fn get(&self, index: usize) -> Option<CifarImage> {
        let image = self.inner.get(index)?;
        Some(self.augmentation.apply(&image, &mut thread_rng()))
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
