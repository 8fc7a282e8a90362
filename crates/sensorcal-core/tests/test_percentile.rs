mod common;

use approx::assert_abs_diff_eq;

use sensorcal_core::filters::percentile::{
    display_range, nan_percentile, symmetric_bound, symmetric_percentiles,
};

#[test]
fn test_nan_values_are_ignored() {
    let data = [f64::NAN, 1.0, 2.0, f64::NAN, 3.0];
    assert_eq!(nan_percentile(&data, 50.0).unwrap(), 2.0);
    assert_eq!(nan_percentile(&data, 100.0).unwrap(), 3.0);
}

#[test]
fn test_all_nan_is_an_error() {
    assert!(nan_percentile(&[f64::NAN, f64::NAN], 50.0).is_err());
    assert!(nan_percentile(&[], 50.0).is_err());
}

#[test]
fn test_symmetric_percentiles_cover_requested_fraction() {
    let data = common::pseudo_random(100_000, 11);
    let (lo, hi) = symmetric_percentiles(&data, 5.0).unwrap();
    let inside = data.iter().filter(|&&v| v >= lo && v <= hi).count();
    let fraction = inside as f64 / data.len() as f64;
    assert_abs_diff_eq!(fraction, 0.90, epsilon = 1e-3);
    assert_abs_diff_eq!(lo, 0.05, epsilon = 0.01);
    assert_abs_diff_eq!(hi, 0.95, epsilon = 0.01);
}

#[test]
fn test_symmetric_bound_coverage() {
    let data: Vec<f64> = common::pseudo_random(50_000, 5)
        .into_iter()
        .map(|v| 2.0 * v - 1.0)
        .collect();
    let b = symmetric_bound(&data, 80.0).unwrap();
    let inside = data.iter().filter(|v| v.abs() <= b).count();
    assert_abs_diff_eq!(inside as f64 / data.len() as f64, 0.80, epsilon = 1e-3);
    assert_abs_diff_eq!(b, 0.8, epsilon = 0.02);
}

#[test]
fn test_default_display_range_trims_outliers() {
    let mut data: Vec<f64> = (0..10_000).map(|i| i as f64 / 10_000.0).collect();
    data.push(1e9);
    let (lo, hi) = display_range(&data).unwrap();
    assert!(lo >= 0.0 && lo < 0.01);
    assert!(hi < 1.0);
}
