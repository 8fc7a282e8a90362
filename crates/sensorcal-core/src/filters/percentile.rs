use crate::consts::DEFAULT_DISPLAY_PERCENTILE;
use crate::error::{CalibrationError, Result};

/// Sorted non-NaN values.
fn sorted_valid<'a>(values: impl IntoIterator<Item = &'a f64>) -> Result<Vec<f64>> {
    let mut sorted: Vec<f64> = values.into_iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Err(CalibrationError::EmptyInput(
            "percentile of an all-NaN array".into(),
        ));
    }
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Percentile `q` (0..=100) of already sorted data, interpolating linearly
/// between the closest ranks.
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 100.0);
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Percentile `q` (0..=100) ignoring NaN values.
pub fn nan_percentile<'a>(values: impl IntoIterator<Item = &'a f64>, q: f64) -> Result<f64> {
    let sorted = sorted_valid(values)?;
    Ok(percentile_of_sorted(&sorted, q))
}

/// Several percentiles at once, ignoring NaN values.
pub fn nan_percentiles<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    qs: &[f64],
) -> Result<Vec<f64>> {
    let sorted = sorted_valid(values)?;
    Ok(qs.iter().map(|&q| percentile_of_sorted(&sorted, q)).collect())
}

/// Display bounds `(P(percent), P(100 - percent))`, ignoring NaN values.
pub fn symmetric_percentiles<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    percent: f64,
) -> Result<(f64, f64)> {
    let sorted = sorted_valid(values)?;
    Ok((
        percentile_of_sorted(&sorted, percent),
        percentile_of_sorted(&sorted, 100.0 - percent),
    ))
}

/// `symmetric_percentiles` with the default 0.1 % cut on each side.
pub fn display_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Result<(f64, f64)> {
    symmetric_percentiles(values, DEFAULT_DISPLAY_PERCENTILE)
}

/// Bound `b` such that `coverage` percent of the data lie within `[-b, b]`.
pub fn symmetric_bound<'a>(values: impl IntoIterator<Item = &'a f64>, coverage: f64) -> Result<f64> {
    let magnitudes: Vec<f64> = values.into_iter().map(|v| v.abs()).collect();
    nan_percentile(&magnitudes, coverage)
}
