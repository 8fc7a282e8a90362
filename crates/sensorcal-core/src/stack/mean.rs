use ndarray::{Array, Dimension, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{CalibrationError, Result};

/// Per-pixel mean and population standard deviation of a frame stack.
#[derive(Clone, Debug)]
pub struct StackStatistics<D: Dimension> {
    pub mean: Array<f32, D>,
    pub stds: Array<f32, D>,
    pub count: usize,
}

/// Stack frames by computing the mean and standard deviation at each pixel.
///
/// Sums are accumulated in `f64` in two passes (mean, then squared
/// deviations). Large frames are accumulated pixel-parallel.
pub fn stack_mean_std<T, D>(frames: &[Array<T, D>]) -> Result<StackStatistics<D>>
where
    T: Copy + Into<f64> + Send + Sync,
    D: Dimension,
{
    let first = frames
        .first()
        .ok_or_else(|| CalibrationError::EmptyInput("no frames to stack".into()))?;
    for frame in &frames[1..] {
        if frame.shape() != first.shape() {
            return Err(CalibrationError::ShapeMismatch {
                left: first.shape().to_vec(),
                right: frame.shape().to_vec(),
            });
        }
    }

    let n = frames.len() as f64;
    let parallel = first.len() >= PARALLEL_PIXEL_THRESHOLD;

    let mut sum = Array::<f64, D>::zeros(first.raw_dim());
    for frame in frames {
        let zip = Zip::from(&mut sum).and(frame);
        if parallel {
            zip.par_for_each(|s, &v| *s += v.into());
        } else {
            zip.for_each(|s, &v| *s += v.into());
        }
    }
    let mean = sum.mapv(|s| s / n);

    let mut squares = Array::<f64, D>::zeros(first.raw_dim());
    for frame in frames {
        let zip = Zip::from(&mut squares).and(&mean).and(frame);
        if parallel {
            zip.par_for_each(|s, &m, &v| *s += (v.into() - m).powi(2));
        } else {
            zip.for_each(|s, &m, &v| *s += (v.into() - m).powi(2));
        }
    }

    Ok(StackStatistics {
        mean: mean.mapv(|m| m as f32),
        stds: squares.mapv(|s| (s / n).sqrt() as f32),
        count: frames.len(),
    })
}
