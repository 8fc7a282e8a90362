use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayView2, Ix2};
use tracing::debug;

use crate::error::{CalibrationError, Result};
use crate::io::npy::read_npy;

/// Bias map inside `products`.
pub const BIAS_FILE: &str = "bias.npy";

/// Load `products/bias.npy` and the path it came from.
pub fn load_bias_map(products: &Path) -> Result<(Array2<f64>, PathBuf)> {
    let path = products.join(BIAS_FILE);
    let bias = read_npy(&path)?.into_dimensionality::<Ix2>()?;
    Ok((bias, path))
}

/// `data - bias`, element-wise.
pub fn subtract_bias(data: &ArrayView2<f64>, bias: &ArrayView2<f64>) -> Result<Array2<f64>> {
    if data.dim() != bias.dim() {
        return Err(CalibrationError::ShapeMismatch {
            left: data.shape().to_vec(),
            right: bias.shape().to_vec(),
        });
    }
    Ok(data - bias)
}

/// Subtract the saved bias map from `data`.
pub fn correct_bias(products: &Path, data: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let (bias, path) = load_bias_map(products)?;
    debug!("Bias correction using {}", path.display());
    subtract_bias(data, &bias.view())
}
