use std::path::Path;

use ndarray::{Array, Array2, Dimension, Ix2};
use tracing::debug;

use crate::error::{CalibrationError, Result};
use crate::io::filename::split_iso;
use crate::io::layout::files_with_suffix;
use crate::io::npy::{read_npy, read_npy_u8};

/// Bayer colour mask stored alongside the stacks.
pub const COLOUR_FILE: &str = "colour.npy";

/// Load every `*<suffix>` array in `folder`, in filename order, together with
/// a value parsed from each filename. All arrays must share one shape.
pub fn load_npy<T, D, F>(folder: &Path, suffix: &str, parse: F) -> Result<(Vec<T>, Vec<Array<f64, D>>)>
where
    D: Dimension,
    F: Fn(&Path) -> Result<T>,
{
    let files = files_with_suffix(folder, suffix)?;
    if files.is_empty() {
        return Err(CalibrationError::NoMatchingFiles {
            folder: folder.to_path_buf(),
            pattern: suffix.to_string(),
        });
    }

    let mut values = Vec::with_capacity(files.len());
    let mut arrays: Vec<Array<f64, D>> = Vec::with_capacity(files.len());
    for file in &files {
        let array = read_npy(file)?.into_dimensionality::<D>()?;
        if let Some(first) = arrays.first() {
            if first.shape() != array.shape() {
                return Err(CalibrationError::ShapeMismatch {
                    left: first.shape().to_vec(),
                    right: array.shape().to_vec(),
                });
            }
        }
        values.push(parse(file)?);
        arrays.push(array);
    }
    debug!("Loaded {} '*{}' arrays from {}", arrays.len(), suffix, folder.display());
    Ok((values, arrays))
}

/// `*_mean.npy` RAW means.
pub fn load_means<T, F>(folder: &Path, parse: F) -> Result<(Vec<T>, Vec<Array2<f64>>)>
where
    F: Fn(&Path) -> Result<T>,
{
    load_npy::<T, Ix2, F>(folder, "_mean.npy", parse)
}

/// `*_stds.npy` RAW standard deviations.
pub fn load_stds<T, F>(folder: &Path, parse: F) -> Result<(Vec<T>, Vec<Array2<f64>>)>
where
    F: Fn(&Path) -> Result<T>,
{
    load_npy::<T, Ix2, F>(folder, "_stds.npy", parse)
}

/// `*_jmean.npy` JPEG means (height × width × 3).
pub fn load_jmeans<T, F>(folder: &Path, parse: F) -> Result<(Vec<T>, Vec<ndarray::Array3<f64>>)>
where
    F: Fn(&Path) -> Result<T>,
{
    load_npy(folder, "_jmean.npy", parse)
}

/// `*_jstds.npy` JPEG standard deviations (height × width × 3).
pub fn load_jstds<T, F>(folder: &Path, parse: F) -> Result<(Vec<T>, Vec<ndarray::Array3<f64>>)>
where
    F: Fn(&Path) -> Result<T>,
{
    load_npy(folder, "_jstds.npy", parse)
}

/// The Bayer colour mask in `stacks/colour.npy`.
pub fn load_colour(stacks: &Path) -> Result<Array2<u8>> {
    Ok(read_npy_u8(&stacks.join(COLOUR_FILE))?.into_dimensionality::<Ix2>()?)
}

/// First number in `stacks/linearity/default_angle.dat`.
pub fn load_angle(stacks: &Path) -> Result<f64> {
    let path = stacks.join("linearity").join("default_angle.dat");
    let contents = std::fs::read_to_string(&path)?;
    read_text_values(&contents)
        .into_iter()
        .next()
        .ok_or_else(|| CalibrationError::EmptyInput(format!("no angle in {}", path.display())))
}

/// ISO speed from the filename and the gain table itself.
pub fn read_gain_table(path: &Path) -> Result<(u32, Array2<f64>)> {
    let table = read_npy(path)?.into_dimensionality::<Ix2>()?;
    Ok((split_iso(path)?, table))
}

/// Whitespace-separated numbers of a plain-text table, skipping `#` comments
/// and anything that does not parse.
pub fn read_text_values(contents: &str) -> Vec<f64> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(str::split_whitespace)
        .filter_map(|token| token.parse().ok())
        .collect()
}
