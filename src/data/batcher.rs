// ============================================================
// Layer 4 - Image Batcher
// ============================================================
// Turns a host-side SyntheticBatch into tensors on the target
// device.
//
//   Input:  SyntheticBatch with N flat images of shape [C, H, W]
//   Output: ImageBatch with images [N, C, H, W] and targets [N, K]
//
// The generator already produces whole batches, so this works on
// one batch at a time instead of stacking individual samples.

use burn::prelude::*;

use crate::data::synthetic::SyntheticBatch;

/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Images, shape [batch_size, channels, height, width]
    pub images: Tensor<B, 4>,

    /// One-hot targets, shape [batch_size, num_classes]
    pub targets: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, batch: SyntheticBatch) -> ImageBatch<B> {
        let n           = batch.batch_size();
        let [c, h, w]   = batch.shape;
        let num_classes = if n > 0 { batch.one_hot.len() / n } else { 0 };

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(batch.images, [n, c, h, w]),
            &self.device,
        );
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(batch.one_hot, [n, num_classes]),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}
