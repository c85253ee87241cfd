// ============================================================
// Layer 4 — CIFAR Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<CifarImage>
// into normalised image tensors plus class targets.
//
//   Input:  N images, each 3×32×32 bytes (CHW)
//   Output: images  [N, 3, 32, 32] float
//           targets [N]            int
//
// Normalisation per channel c:
//   x = (byte / 255 - MEAN[c]) / STD[c]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::cifar::{CifarImage, CHANNELS, IMAGE_SIDE};

/// Per-channel (R, G, B) mean of the CIFAR training pixels in [0, 1]
pub const MEAN: [f32; CHANNELS] = [0.4914, 0.4822, 0.4465];
/// Per-channel standard deviation, same order as `MEAN`
pub const STD: [f32; CHANNELS] = [0.2023, 0.1994, 0.2010];

/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct CifarBatch<B: Backend> {
    /// Shape: [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,
    /// Shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Stateless apart from the device tensors are created on.
#[derive(Clone, Debug)]
pub struct CifarBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CifarBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Scale one CHW byte image to normalised floats.
pub fn normalise(pixels: &[u8]) -> Vec<f32> {
    let plane = IMAGE_SIDE * IMAGE_SIDE;
    pixels
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let c = (i / plane).min(CHANNELS - 1);
            (p as f32 / 255.0 - MEAN[c]) / STD[c]
        })
        .collect()
}

impl<B: Backend> Batcher<CifarImage, CifarBatch<B>> for CifarBatcher<B> {
    fn batch(&self, items: Vec<CifarImage>) -> CifarBatch<B> {
        let batch_size = items.len();

        // ── Flatten every image into one contiguous NCHW buffer ───────────────
        let pixels: Vec<f32> = items.iter().flat_map(|im| normalise(&im.pixels)).collect();
        let labels: Vec<i64> = items.iter().map(|im| im.label as i64).collect();

        // ── Upload to the device ──────────────────────────────────────────────
        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, CHANNELS, IMAGE_SIDE, IMAGE_SIDE]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(TensorData::new(labels, [batch_size]), &self.device);

        CifarBatch { images, targets }
    }
}
