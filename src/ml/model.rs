// ============================================================
// Layer 5 - ResNet-50 Model
// ============================================================
// Keras-style ResNet-50 built from Burn building blocks:
//
//   stem:    7x7/2 conv → BN → ReLU → 3x3/2 max-pool
//   stages:  4 stages of bottleneck blocks ([3, 4, 6, 3] blocks),
//            widths base, 2*base, 4*base, 8*base, expansion 4
//   head:    global average pool → linear → class logits
//
// The first block of stages 3-5 downsamples with stride 2 on its
// first 1x1 conv (Keras puts the stride there, torchvision puts it
// on the 3x3). Each first block has a projection shortcut.
//
// `stage_blocks` and `base_width` shrink the network for tests;
// the defaults give the standard ResNet-50.
//
// Reference: He et al. (2015) Deep Residual Learning, Burn Book §3 (Modules)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu, softmax},
};

/// Bottleneck output channels are four times the block width
const EXPANSION: usize = 4;

/// Five stride-2 reductions between input and the pooled features
pub const MIN_IMAGE_SIZE: usize = 32;

#[derive(Config, Debug)]
pub struct ResNetConfig {
    pub num_classes: usize,
    #[config(default = 3)]
    pub in_channels: usize,
    #[config(default = "[3, 4, 6, 3]")]
    pub stage_blocks: [usize; 4],
    #[config(default = 64)]
    pub base_width: usize,
}

impl ResNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNet<B> {
        let stem_conv = Conv2dConfig::new([self.in_channels, self.base_width], [7, 7])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(3, 3))
            .init(device);
        let stem_bn = BatchNormConfig::new(self.base_width).init(device);
        let stem_pool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        let mut in_channels = self.base_width;
        let mut stages = Vec::with_capacity(self.stage_blocks.len());
        for (index, &blocks) in self.stage_blocks.iter().enumerate() {
            let width  = self.base_width << index;
            let stride = if index == 0 { 1 } else { 2 };
            stages.push(Stage::new(in_channels, width, blocks, stride, device));
            in_channels = width * EXPANSION;
        }

        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let head = LinearConfig::new(in_channels, self.num_classes).init(device);

        ResNet { stem_conv, stem_bn, stem_pool, stages, pool, head }
    }
}

#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    pub stem_conv: Conv2d<B>,
    pub stem_bn:   BatchNorm<B, 2>,
    pub stem_pool: MaxPool2d,
    pub stages:    Vec<Stage<B>>,
    pub pool:      AdaptiveAvgPool2d,
    pub head:      Linear<B>,
}

impl<B: Backend> ResNet<B> {
    /// images: [batch, channels, height, width] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.stem_bn.forward(self.stem_conv.forward(images)));
        let mut x = self.stem_pool.forward(x);
        for stage in &self.stages {
            x = stage.forward(x);
        }
        let x = self.pool.forward(x); // [batch, features, 1, 1]
        self.head.forward(x.flatten::<2>(1, 3))
    }

    /// Class probabilities, the equivalent of a softmax top layer
    pub fn forward_probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    /// Categorical cross-entropy against one-hot targets, averaged over the batch.
    pub fn forward_loss(&self, images: Tensor<B, 4>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        categorical_cross_entropy(self.forward(images), targets)
    }

    /// Names of the weight-bearing layers in forward order, using the
    /// Keras naming scheme (`conv1_conv`, `conv1_bn`, `conv2_block1_1_conv`, ...).
    pub fn layer_names(&self) -> Vec<String> {
        let mut names = vec!["conv1_conv".to_string(), "conv1_bn".to_string()];
        for (s, stage) in self.stages.iter().enumerate() {
            for (b, block) in stage.blocks.iter().enumerate() {
                let prefix = format!("conv{}_block{}", s + 2, b + 1);
                let first  = if block.shortcut.is_some() { 0 } else { 1 };
                for part in first..=3 {
                    names.push(format!("{prefix}_{part}_conv"));
                    names.push(format!("{prefix}_{part}_bn"));
                }
            }
        }
        names.push("predictions".to_string());
        names
    }
}

pub fn categorical_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (log_softmax(logits, 1) * targets).sum_dim(1).mean().neg()
}

// ─── Stage ───────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    pub blocks: Vec<Bottleneck<B>>,
}

impl<B: Backend> Stage<B> {
    fn new(in_channels: usize, width: usize, blocks: usize, stride: usize, device: &B::Device) -> Self {
        let out_channels = width * EXPANSION;
        let blocks = (0..blocks)
            .map(|i| {
                if i == 0 {
                    Bottleneck::new(in_channels, width, stride, true, device)
                } else {
                    Bottleneck::new(out_channels, width, 1, false, device)
                }
            })
            .collect();
        Self { blocks }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.blocks.iter().fold(x, |x, block| block.forward(x))
    }
}

// ─── Bottleneck ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub conv1:    Conv2d<B>,
    pub bn1:      BatchNorm<B, 2>,
    pub conv2:    Conv2d<B>,
    pub bn2:      BatchNorm<B, 2>,
    pub conv3:    Conv2d<B>,
    pub bn3:      BatchNorm<B, 2>,
    pub shortcut: Option<Shortcut<B>>,
}

impl<B: Backend> Bottleneck<B> {
    fn new(
        in_channels: usize,
        width:       usize,
        stride:      usize,
        project:     bool,
        device:      &B::Device,
    ) -> Self {
        let out_channels = width * EXPANSION;
        let conv1 = Conv2dConfig::new([in_channels, width], [1, 1])
            .with_stride([stride, stride])
            .init(device);
        let conv2 = Conv2dConfig::new([width, width], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv3 = Conv2dConfig::new([width, out_channels], [1, 1]).init(device);

        let shortcut = project.then(|| Shortcut {
            conv: Conv2dConfig::new([in_channels, out_channels], [1, 1])
                .with_stride([stride, stride])
                .init(device),
            bn: BatchNormConfig::new(out_channels).init(device),
        });

        Self {
            conv1,
            bn1: BatchNormConfig::new(width).init(device),
            conv2,
            bn2: BatchNormConfig::new(width).init(device),
            conv3,
            bn3: BatchNormConfig::new(out_channels).init(device),
            shortcut,
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match &self.shortcut {
            Some(shortcut) => shortcut.forward(x.clone()),
            None => x.clone(),
        };
        let out = relu(self.bn1.forward(self.conv1.forward(x)));
        let out = relu(self.bn2.forward(self.conv2.forward(out)));
        let out = self.bn3.forward(self.conv3.forward(out));
        relu(out + identity)
    }
}

/// Projection used when a block changes channel count or resolution
#[derive(Module, Debug)]
pub struct Shortcut<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn:   BatchNorm<B, 2>,
}

impl<B: Backend> Shortcut<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }
}
