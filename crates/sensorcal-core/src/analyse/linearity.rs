//! Sensor linearity from polariser-modulated intensity series.

use ndarray::{Array2, ArrayView2, Axis, Ix3};
use rayon::prelude::*;
use tracing::debug;

use crate::color::bayer::pull_apart;
use crate::consts::BAYER_CHANNEL_COUNT;
use crate::error::{CalibrationError, Result};

/// Relative intensity behind a linear polariser at `angle`, with `offset`
/// the angle of maximum transmission (both in degrees): `cos²(angle - offset)`.
pub fn malus(angle: f64, offset: f64) -> f64 {
    (angle - offset).to_radians().cos().powi(2)
}

/// Uncertainty of [`malus`] for an angle uncertainty of `sigma` degrees.
pub fn malus_error(angle: f64, offset: f64, sigma: f64) -> f64 {
    (2.0 * (angle - offset).to_radians()).sin().abs() * sigma.to_radians()
}

/// Coefficient of determination of `predicted` against `observed`.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Least-squares line `y = slope * x + intercept`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len() as f64;
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

/// R² of a linear fit of `values` against `intensities`, leaving out values
/// at or above `saturation`. NaN when fewer than two points remain.
pub fn linear_r2(intensities: &[f64], values: &[f64], saturation: f64) -> f64 {
    let (x, y): (Vec<f64>, Vec<f64>) = intensities
        .iter()
        .zip(values)
        .filter(|(_, v)| **v < saturation)
        .map(|(&i, &v)| (i, v))
        .unzip();
    match linear_fit(&x, &y) {
        Some((slope, intercept)) => {
            let predicted: Vec<f64> = x.iter().map(|i| slope * i + intercept).collect();
            r_squared(&y, &predicted)
        }
        None => f64::NAN,
    }
}

/// Per-pixel linearity of a series of mean frames taken at different
/// polariser angles.
///
/// Returns R² with shape `(4, H/2 * W/2)`: one row per RGBG2 channel.
pub fn linearity_r2(
    angles: &[f64],
    offset: f64,
    means: &[Array2<f64>],
    mask: &ArrayView2<u8>,
    saturation: f64,
) -> Result<Array2<f64>> {
    if angles.len() != means.len() {
        return Err(CalibrationError::ShapeMismatch {
            left: vec![angles.len()],
            right: vec![means.len()],
        });
    }
    if means.is_empty() {
        return Err(CalibrationError::EmptyInput("no linearity stacks".into()));
    }
    let views: Vec<ArrayView2<f64>> = means.iter().map(|m| m.view()).collect();
    let stacked = ndarray::stack(Axis(0), &views)?;
    let intensities: Vec<f64> = angles.iter().map(|&a| malus(a, offset)).collect();
    debug!("Malus intensities: {:?}", intensities);

    // (4, n_angles, H/2, W/2)
    let rgbg = pull_apart(&stacked.view().into_dyn(), mask)?;
    let shape = rgbg.shape().to_vec();
    let pixels = shape[2] * shape[3];

    let mut r2 = Array2::<f64>::zeros((BAYER_CHANNEL_COUNT, pixels));
    for (c, mut out) in r2.axis_iter_mut(Axis(0)).enumerate() {
        let channel = rgbg
            .index_axis(Axis(0), c)
            .into_dimensionality::<Ix3>()?
            .into_shape_with_order((angles.len(), pixels))?
            .to_owned();
        let values: Vec<f64> = (0..pixels)
            .into_par_iter()
            .map(|p| {
                let series = channel.column(p).to_vec();
                linear_r2(&intensities, &series, saturation)
            })
            .collect();
        out.assign(&ndarray::Array1::from(values));
    }
    Ok(r2)
}
