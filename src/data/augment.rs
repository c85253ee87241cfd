// ============================================================
// Layer 4 — Training Augmentation
// ============================================================
// Standard CIFAR augmentation, applied per sample on the fly:
//
//   1. zero-pad the 32×32 image by 4 pixels on every side
//   2. take a random 32×32 crop of the 40×40 result
//   3. flip horizontally with probability 0.5
//
// Works directly on the CHW byte planes of a `CifarImage`.

use rand::Rng;

use crate::data::cifar::{CifarImage, CHANNELS, IMAGE_SIDE};

pub const DEFAULT_PADDING: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct Augmentation {
    padding: usize,
}

impl Default for Augmentation {
    fn default() -> Self {
        Self { padding: DEFAULT_PADDING }
    }
}

impl Augmentation {
    pub fn apply<R: Rng + ?Sized>(&self, image: &CifarImage, rng: &mut R) -> CifarImage {
        let max_offset = 2 * self.padding;
        let dy = rng.gen_range(0..=max_offset);
        let dx = rng.gen_range(0..=max_offset);
        let flip = rng.gen_bool(0.5);
        CifarImage { pixels: self.crop(&image.pixels, dy, dx, flip), label: image.label }
    }

    /// Crop at offset (dy, dx) in padded coordinates, optionally mirrored.
    fn crop(&self, pixels: &[u8], dy: usize, dx: usize, flip: bool) -> Vec<u8> {
        let pad = self.padding as isize;
        let side = IMAGE_SIDE as isize;
        let mut out = vec![0u8; pixels.len()];

        for c in 0..CHANNELS {
            let plane = c * IMAGE_SIDE * IMAGE_SIDE;
            for y in 0..IMAGE_SIDE {
                let src_y = y as isize + dy as isize - pad;
                if src_y < 0 || src_y >= side {
                    continue;
                }
                for x in 0..IMAGE_SIDE {
                    let out_x = if flip { IMAGE_SIDE - 1 - x } else { x };
                    let src_x = x as isize + dx as isize - pad;
                    if src_x < 0 || src_x >= side {
                        continue;
                    }
                    let src = plane + src_y as usize * IMAGE_SIDE + src_x as usize;
                    out[plane + y * IMAGE_SIDE + out_x] = pixels[src];
                }
            }
        }
        out
    }
}
