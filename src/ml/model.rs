use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

/// Base channel counts of the three stages, before widening.
const STAGE_CHANNELS: [usize; 3] = [16, 32, 64];
const STAGE_STRIDES: [usize; 3] = [1, 2, 2];
const STEM_CHANNELS: usize = 16;

// #[derive(Config)] already provides Clone, Serialize and Deserialize.
#[derive(Config, Debug)]
pub struct NetworkConfig {
    pub num_classes: usize,
    /// Basic blocks in each of the three stages
    pub blocks_per_stage: usize,
    #[config(default = 1)]
    pub widen_factor: usize,
    #[config(default = 0.0)]
    pub drop_rate: f64,
}

impl NetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CifarNet<B> {
        let stem = conv3x3(3, STEM_CHANNELS, 1, device);
        let stem_bn = BatchNormConfig::new(STEM_CHANNELS).init(device);

        let mut blocks = Vec::with_capacity(3 * self.blocks_per_stage);
        let mut in_channels = STEM_CHANNELS;
        for (base, stride) in STAGE_CHANNELS.iter().zip(STAGE_STRIDES) {
            let out_channels = base * self.widen_factor;
            for b in 0..self.blocks_per_stage {
                let stride = if b == 0 { stride } else { 1 };
                blocks.push(self.build_block(in_channels, out_channels, stride, device));
                in_channels = out_channels;
            }
        }

        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let fc = LinearConfig::new(in_channels, self.num_classes).init(device);
        CifarNet { stem, stem_bn, blocks, pool, fc }
    }

    fn build_block<B: Backend>(
        &self,
        in_channels: usize,
        out_channels: usize,
        stride: usize,
        device: &B::Device,
    ) -> BasicBlock<B> {
        let shortcut = (stride != 1 || in_channels != out_channels).then(|| Shortcut {
            conv: Conv2dConfig::new([in_channels, out_channels], [1, 1])
                .with_stride([stride, stride])
                .with_bias(false)
                .init(device),
            bn: BatchNormConfig::new(out_channels).init(device),
        });
        BasicBlock {
            conv1: conv3x3(in_channels, out_channels, stride, device),
            bn1: BatchNormConfig::new(out_channels).init(device),
            conv2: conv3x3(out_channels, out_channels, 1, device),
            bn2: BatchNormConfig::new(out_channels).init(device),
            dropout: DropoutConfig::new(self.drop_rate).init(),
            shortcut,
        }
    }
}

fn conv3x3<B: Backend>(in_channels: usize, out_channels: usize, stride: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([in_channels, out_channels], [3, 3])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_bias(false)
        .init(device)
}

/// 1×1 projection used when a block changes resolution or width.
#[derive(Module, Debug)]
pub struct Shortcut<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn: BatchNorm<B, 2>,
}

#[derive(Module, Debug)]
pub struct BasicBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub bn1: BatchNorm<B, 2>,
    pub conv2: Conv2d<B>,
    pub bn2: BatchNorm<B, 2>,
    pub dropout: Dropout,
    pub shortcut: Option<Shortcut<B>>,
}

impl<B: Backend> BasicBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = relu(self.bn1.forward(self.conv1.forward(x.clone())));
        let out = self.dropout.forward(out);
        let out = self.bn2.forward(self.conv2.forward(out));
        let residual = match &self.shortcut {
            Some(s) => s.bn.forward(s.conv.forward(x)),
            None => x,
        };
        relu(out + residual)
    }
}

#[derive(Module, Debug)]
pub struct CifarNet<B: Backend> {
    pub stem: Conv2d<B>,
    pub stem_bn: BatchNorm<B, 2>,
    pub blocks: Vec<BasicBlock<B>>,
    pub pool: AdaptiveAvgPool2d,
    /// Classifier head; weight shape [features, num_classes]
    pub fc: Linear<B>,
}

impl<B: Backend> CifarNet<B> {
    /// images: [batch, 3, 32, 32] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = relu(self.stem_bn.forward(self.stem.forward(images)));
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = self.pool.forward(x); // [batch, channels, 1, 1]
        self.fc.forward(x.flatten::<2>(1, 3))
    }

    pub fn num_classes(&self) -> usize {
        self.fc.weight.dims()[1]
    }

    /// Shape fingerprint stored with every checkpoint. Two networks
    /// with the same fingerprint have interchangeable records; the
    /// dropout rate does not affect it.
    pub fn architecture(&self) -> String {
        let [features, classes] = self.fc.weight.dims();
        format!("cifarnet(blocks={}, features={}, classes={})", self.blocks.len(), features, classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn resnet8_forward_shape() {
        let device = Default::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(10, 1).init(&device);
        let images = Tensor::<NdArray, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [2, 10]);
        assert_eq!(model.num_classes(), 10);
    }

    #[test]
    fn shortcuts_only_where_shape_changes() {
        let device = Default::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(10, 2).init(&device);
        let with_shortcut: Vec<bool> = model.blocks.iter().map(|b| b.shortcut.is_some()).collect();
        assert_eq!(with_shortcut, vec![false, false, true, false, true, false]);
    }

    #[test]
    fn widening_scales_head_input() {
        let device = Default::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(100, 1).with_widen_factor(2).init(&device);
        assert_eq!(model.fc.weight.dims(), [128, 100]);
        // stage one now widens 16 → 32, so it needs a projection
        assert!(model.blocks[0].shortcut.is_some());
    }

    #[test]
    fn architecture_tracks_shape_not_dropout() {
        let device = Default::default();
        let a: CifarNet<NdArray> = NetworkConfig::new(10, 1).init(&device);
        let b: CifarNet<NdArray> = NetworkConfig::new(10, 1).with_drop_rate(0.3).init(&device);
        let c: CifarNet<NdArray> = NetworkConfig::new(10, 2).init(&device);
        assert_eq!(a.architecture(), "cifarnet(blocks=3, features=64, classes=10)");
        assert_eq!(a.architecture(), b.architecture());
        assert_ne!(a.architecture(), c.architecture());
    }
}
