use ndarray::{ArrayD, ArrayViewD, ArrayViewMut1, Axis, Zip};

use crate::consts::{GAUSS_TRUNCATE, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{CalibrationError, Result};

/// Gaussian standard deviation, shared by all axes or given per axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Sigma {
    Scalar(f64),
    PerAxis(Vec<f64>),
}

impl Sigma {
    fn per_axis(&self, ndim: usize) -> Result<Vec<f64>> {
        let sigmas = match self {
            Self::Scalar(s) => vec![*s; ndim],
            Self::PerAxis(v) if v.len() == ndim => v.clone(),
            Self::PerAxis(v) => {
                return Err(CalibrationError::ShapeMismatch {
                    left: vec![v.len()],
                    right: vec![ndim],
                })
            }
        };
        if let Some(bad) = sigmas.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(CalibrationError::InvalidParameter(format!(
                "Gaussian sigma must be finite and non-negative, got {bad}"
            )));
        }
        Ok(sigmas)
    }
}

impl From<f64> for Sigma {
    fn from(s: f64) -> Self {
        Self::Scalar(s)
    }
}

impl<const N: usize> From<[f64; N]> for Sigma {
    fn from(v: [f64; N]) -> Self {
        Self::PerAxis(v.to_vec())
    }
}

/// Normalised Gaussian kernel truncated at 4 sigma.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSS_TRUNCATE * sigma + 0.5) as usize;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / s2).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Index into `[0, n)` with mirror boundaries: `d c b a | a b c d | d c b a`.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let m = i.rem_euclid(2 * n);
    (if m < n { m } else { 2 * n - 1 - m }) as usize
}

fn convolve_lane(mut lane: ArrayViewMut1<f64>, kernel: &[f64]) {
    let n = lane.len();
    let radius = (kernel.len() / 2) as isize;
    let src = lane.to_vec();
    for (i, out) in lane.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (k, &w) in kernel.iter().enumerate() {
            sum += w * src[reflect(i as isize + k as isize - radius, n)];
        }
        *out = sum;
    }
}

fn convolve_axis(data: &mut ArrayD<f64>, axis: usize, kernel: &[f64]) {
    let parallel = data.len() >= PARALLEL_PIXEL_THRESHOLD;
    let lanes = Zip::from(data.lanes_mut(Axis(axis)));
    if parallel {
        lanes.par_for_each(|lane| convolve_lane(lane, kernel));
    } else {
        lanes.for_each(|lane| convolve_lane(lane, kernel));
    }
}

/// Separable N-dimensional Gaussian filter. Axes with sigma 0 are left untouched.
pub fn gauss_filter(data: &ArrayViewD<f64>, sigma: &Sigma) -> Result<ArrayD<f64>> {
    let sigmas = sigma.per_axis(data.ndim())?;
    let mut out = data.to_owned();
    for (axis, &s) in sigmas.iter().enumerate() {
        if s <= f64::EPSILON || data.len_of(Axis(axis)) == 0 {
            continue;
        }
        convolve_axis(&mut out, axis, &gaussian_kernel(s));
    }
    Ok(out)
}

/// Gaussian filter that ignores NaN inputs.
///
/// Values (NaN set to 0) and weights (0 for NaN, 1 otherwise) are filtered
/// separately and divided. Outputs with no valid sample in the kernel support
/// are NaN.
pub fn gauss_nan(data: &ArrayViewD<f64>, sigma: &Sigma) -> Result<ArrayD<f64>> {
    let values = data.mapv(|v| if v.is_nan() { 0.0 } else { v });
    let weights = data.mapv(|v| if v.is_nan() { 0.0 } else { 1.0 });

    let values = gauss_filter(&values.view(), sigma)?;
    let weights = gauss_filter(&weights.view(), sigma)?;

    Ok(Zip::from(&values)
        .and(&weights)
        .map_collect(|&v, &w| if w > 0.0 { v / w } else { f64::NAN }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 2 * 8 + 1);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..k.len() / 2 {
            assert_eq!(k[i], k[k.len() - 1 - i]);
        }
    }

    #[test]
    fn reflect_mirrors_about_edges() {
        let idx: Vec<usize> = (-4..8).map(|i| reflect(i, 4)).collect();
        assert_eq!(idx, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(reflect(-3, 1), 0);
    }
}
