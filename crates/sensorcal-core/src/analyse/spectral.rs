//! Spectral response curves and effective bandwidths.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1, Axis, Ix2};
use tracing::debug;

use crate::consts::{BAYER_CHANNEL_COUNT, RGBG2_LABELS};
use crate::error::{CalibrationError, Result};
use crate::io::loaders::read_text_values;
use crate::io::npy::read_npy;

/// Preferred response data, from a monochromator.
pub const MONOCHROMATOR_CURVE_FILE: &str = "spectral_response/monochromator_curve.npy";
/// Fallback response data.
pub const CURVE_FILE: &str = "spectral_response/curve.npy";
/// Saved bandwidths inside `products`.
pub const BANDWIDTHS_FILE: &str = "spectral_bandwidths.dat";

/// RGBG2 spectral response curves.
#[derive(Clone, Debug)]
pub struct SpectralResponse {
    pub wavelengths: Array1<f64>,
    /// Shape `(4, n)`, one row per RGBG2 channel.
    pub responses: Array2<f64>,
    /// Shape `(4, n)`.
    pub errors: Array2<f64>,
    /// File the curves were read from.
    pub source: PathBuf,
}

impl SpectralResponse {
    /// From a `9 × n` array: wavelengths, four responses, four errors.
    pub fn from_array(array: Array2<f64>, source: PathBuf) -> Result<Self> {
        let rows = 1 + 2 * BAYER_CHANNEL_COUNT;
        if array.nrows() != rows {
            return Err(CalibrationError::ShapeMismatch {
                left: array.shape().to_vec(),
                right: vec![rows, array.ncols()],
            });
        }
        Ok(Self {
            wavelengths: array.row(0).to_owned(),
            responses: array.slice(ndarray::s![1..1 + BAYER_CHANNEL_COUNT, ..]).to_owned(),
            errors: array.slice(ndarray::s![1 + BAYER_CHANNEL_COUNT.., ..]).to_owned(),
            source,
        })
    }

    /// Effective bandwidth of each channel.
    pub fn bandwidths(&self) -> [f64; BAYER_CHANNEL_COUNT] {
        let mut out = [0.0; BAYER_CHANNEL_COUNT];
        for (b, response) in out.iter_mut().zip(self.responses.axis_iter(Axis(0))) {
            *b = effective_bandwidth(&self.wavelengths.view(), &response);
        }
        out
    }
}

/// Load the response curves from `results`, preferring the monochromator
/// data and falling back to the generic curve only when it does not exist.
pub fn read_spectral_responses(results: &Path) -> Result<SpectralResponse> {
    let preferred = results.join(MONOCHROMATOR_CURVE_FILE);
    let path = if preferred.exists() {
        preferred
    } else {
        debug!("{} not found, using {}", preferred.display(), CURVE_FILE);
        results.join(CURVE_FILE)
    };
    let array = read_npy(&path)?.into_dimensionality::<Ix2>()?;
    SpectralResponse::from_array(array, path)
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapezoid(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

/// `∫R dλ / max R`, ignoring NaN responses.
pub fn effective_bandwidth(wavelengths: &ArrayView1<f64>, response: &ArrayView1<f64>) -> f64 {
    let cleaned = response.mapv(|v| if v.is_nan() { 0.0 } else { v });
    let peak = cleaned.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    trapezoid(wavelengths, &cleaned.view()) / peak
}

/// Read the saved bandwidths, one per RGBG2 channel.
pub fn read_spectral_bandwidths(products: &Path) -> Result<[f64; BAYER_CHANNEL_COUNT]> {
    let path = products.join(BANDWIDTHS_FILE);
    let values = read_text_values(&std::fs::read_to_string(&path)?);
    values.try_into().map_err(|v: Vec<f64>| CalibrationError::ShapeMismatch {
        left: vec![v.len()],
        right: vec![BAYER_CHANNEL_COUNT],
    })
}

pub fn write_spectral_bandwidths(products: &Path, bandwidths: &[f64; BAYER_CHANNEL_COUNT]) -> Result<PathBuf> {
    std::fs::create_dir_all(products)?;
    let path = products.join(BANDWIDTHS_FILE);
    let mut contents = format!("# Effective spectral bandwidths (nm): {}\n", RGBG2_LABELS.join(" "));
    let values: Vec<String> = bandwidths.iter().map(|b| format!("{b:.6}")).collect();
    contents.push_str(&values.join(" "));
    contents.push('\n');
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn box_response_bandwidth_is_its_width() {
        let wavelengths = array![400.0, 410.0, 420.0, 430.0, 440.0];
        let response = array![0.0, 2.0, 2.0, 2.0, 0.0];
        // Trapezoids: 10 + 20 + 20 + 10 = 60 over a peak of 2.
        assert!((effective_bandwidth(&wavelengths.view(), &response.view()) - 30.0).abs() < 1e-12);
    }
}
