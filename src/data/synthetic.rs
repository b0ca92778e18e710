// ============================================================
// Layer 4 - Synthetic Image Generator
// ============================================================
// Produces an endless stream of (image batch, one-hot label batch)
// pairs without touching the accelerator, so the memory profile
// of the model is not disturbed by data generation.
//
// How the images are made:
//   1. Once, at construction: one template image per class, every
//      element uniform in [0, 2 * num_classes)
//   2. Once, at construction: one noise image, standard normal
//   3. Per batch: a uniform random label per item, and the item's
//      image is template[label] + noise
//
// Reusing the same noise for every item keeps generation cheap at
// very large resolutions. The data is only meant to drive the
// model, not to be learnt from in any meaningful way.
//
// RNG consumption order is templates, then noise, then labels, all
// from a single StdRng. The same seed and arguments therefore
// reproduce the exact same stream.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::domain::error::ConfigError;

/// One generated batch, stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBatch {
    /// Shape of a single image, e.g. [channels, height, width]
    pub shape:   [usize; 3],

    /// `labels.len() * shape volume` pixel values
    pub images:  Vec<f32>,

    /// Class index per item
    pub labels:  Vec<usize>,

    /// `labels.len() * num_classes` one-hot rows
    pub one_hot: Vec<f32>,
}

impl SyntheticBatch {
    pub fn batch_size(&self) -> usize {
        self.labels.len()
    }
}

pub struct SyntheticImages {
    batch_size:    usize,
    num_classes:   usize,
    shape:         [usize; 3],
    templates:     Vec<f32>,
    noise:         Vec<f32>,
    rng:           StdRng,
    batches_drawn: usize,
}

impl SyntheticImages {
    pub fn new(
        batch_size:  usize,
        num_classes: usize,
        shape:       [usize; 3],
        seed:        u64,
    ) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::NotPositive { name: "batch size" });
        }
        if num_classes == 0 {
            return Err(ConfigError::NoClasses);
        }
        if shape.contains(&0) {
            return Err(ConfigError::EmptyShape { shape });
        }
        let volume = buffer_len(shape, 1)?;
        buffer_len(shape, num_classes)?;
        buffer_len(shape, batch_size)?;

        let scale  = 2.0 * num_classes as f32;
        let mut rng = StdRng::seed_from_u64(seed);

        let templates: Vec<f32> = (0..num_classes * volume)
            .map(|_| rng.gen::<f32>() * scale)
            .collect();
        let noise: Vec<f32> = (0..volume)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();

        tracing::debug!(
            "Synthetic generator ready: {} classes, shape {:?}, batch size {}",
            num_classes, shape, batch_size,
        );

        Ok(Self {
            batch_size,
            num_classes,
            shape,
            templates,
            noise,
            rng,
            batches_drawn: 0,
        })
    }

    /// The fixed template image for `class`
    pub fn template(&self, class: usize) -> &[f32] {
        let volume = self.noise.len();
        &self.templates[class * volume..(class + 1) * volume]
    }

    /// The fixed noise image added to every item
    pub fn noise(&self) -> &[f32] {
        &self.noise
    }

    /// Number of batches produced so far
    pub fn batches_drawn(&self) -> usize {
        self.batches_drawn
    }

    fn draw(&mut self) -> SyntheticBatch {
        let labels: Vec<usize> = (0..self.batch_size)
            .map(|_| self.rng.gen_range(0..self.num_classes))
            .collect();

        let volume = self.noise.len();
        let mut images = Vec::with_capacity(self.batch_size * volume);
        for &label in &labels {
            images.extend(
                self.template(label)
                    .iter()
                    .zip(&self.noise)
                    .map(|(t, n)| t + n),
            );
        }

        let one_hot = one_hot(&labels, self.num_classes);
        self.batches_drawn += 1;

        SyntheticBatch { shape: self.shape, images, labels, one_hot }
    }
}

/// Endless: `next` always returns `Some`.
impl Iterator for SyntheticImages {
    type Item = SyntheticBatch;

    fn next(&mut self) -> Option<SyntheticBatch> {
        Some(self.draw())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Number of `f32` values needed for `items` images of `shape`.
/// Fails when the count overflows or the buffer could not be
/// allocated at all.
pub fn buffer_len(shape: [usize; 3], items: usize) -> Result<usize, ConfigError> {
    let too_large = || ConfigError::ImageTooLarge { shape, items };
    let len = shape
        .iter()
        .try_fold(items, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(too_large)?;
    match len.checked_mul(std::mem::size_of::<f32>()) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(len),
        _ => Err(too_large()),
    }
}

/// Encode class indices as rows of `num_classes` values with a
/// single 1.0 at the label position.
pub fn one_hot(labels: &[usize], num_classes: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; labels.len() * num_classes];
    for (row, &label) in labels.iter().enumerate() {
        out[row * num_classes + label] = 1.0;
    }
    out
}

/// Index of the largest value in each row of width `width`.
/// Ties resolve to the first maximum.
pub fn argmax_rows(values: &[f32], width: usize) -> Vec<usize> {
    if width == 0 {
        return Vec::new();
    }
    values
        .chunks(width)
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                    if v > best.1 { (i, v) } else { best }
                })
                .0
        })
        .collect()
}
