use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::info;

use crate::error::{CalibrationError, Result};
use crate::io::npy::write_npy;

/// Read-noise map inside `products`.
pub const READNOISE_FILE: &str = "readnoise.npy";

/// Index of the lowest ISO speed; ties go to the first occurrence.
pub fn select_lowest_iso(isos: &[u32]) -> Result<usize> {
    isos.iter()
        .enumerate()
        .min_by_key(|&(i, &iso)| (iso, i))
        .map(|(i, _)| i)
        .ok_or_else(|| CalibrationError::EmptyInput("no ISO speeds to choose from".into()))
}

/// Save the standard-deviation map of the lowest ISO as `products/readnoise.npy`.
///
/// Returns the chosen ISO and the written path.
pub fn save_readnoise_map(products: &Path, isos: &[u32], stds: &[Array2<f64>]) -> Result<(u32, PathBuf)> {
    if isos.len() != stds.len() {
        return Err(CalibrationError::ShapeMismatch {
            left: vec![isos.len()],
            right: vec![stds.len()],
        });
    }
    let index = select_lowest_iso(isos)?;
    std::fs::create_dir_all(products)?;
    let path = products.join(READNOISE_FILE);
    write_npy(&path, &stds[index])?;
    info!("Read noise map at ISO {} saved to {}", isos[index], path.display());
    Ok((isos[index], path))
}
