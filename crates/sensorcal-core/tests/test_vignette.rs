use approx::assert_abs_diff_eq;
use ndarray::Array2;

use sensorcal_core::flat::flatfield::clip_data;
use sensorcal_core::flat::vignette::{
    apply_vignette_radial, fit_vignette_radial, vignette_radial, VignetteFit,
};

const TRUE_PARAMS: [f64; 7] = [0.2, 0.1, -0.05, 0.02, -0.01, 0.55, 0.45];

#[test]
fn test_fit_recovers_noise_free_parameters() {
    let correction = apply_vignette_radial((40, 60), &TRUE_PARAMS);
    let fit = fit_vignette_radial(&correction.view(), None).unwrap();
    for (fitted, expected) in fit.params.iter().zip(TRUE_PARAMS) {
        assert_abs_diff_eq!(*fitted, expected, epsilon = 1e-6);
    }
    for error in fit.standard_errors {
        assert!(error < 1e-6, "standard error {error}");
    }
}

#[test]
fn test_fit_ignores_nan_border() {
    let full = apply_vignette_radial((48, 64), &TRUE_PARAMS);
    let clipped = clip_data(&full.view(), 4);
    let fit = fit_vignette_radial(&clipped.view(), Some(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5])).unwrap();
    for (fitted, expected) in fit.params.iter().zip(TRUE_PARAMS) {
        assert_abs_diff_eq!(*fitted, expected, epsilon = 1e-5);
    }

    // The model extends over the clipped border.
    let modelled = apply_vignette_radial(full.dim(), &fit.params);
    assert_abs_diff_eq!(modelled[[0, 0]], full[[0, 0]], epsilon = 1e-5);
}

#[test]
fn test_infinite_samples_are_excluded() {
    let mut correction = apply_vignette_radial((40, 60), &TRUE_PARAMS);
    correction[[0, 0]] = f64::INFINITY;
    correction[[5, 5]] = f64::NEG_INFINITY;
    correction[[6, 6]] = f64::NAN;
    let fit = fit_vignette_radial(&correction.view(), None).unwrap();
    assert_abs_diff_eq!(fit.params[0], TRUE_PARAMS[0], epsilon = 1e-6);
}

#[test]
fn test_too_few_samples_is_an_error() {
    let mut correction = Array2::from_elem((4, 4), f64::NAN);
    correction[[1, 1]] = 1.0;
    correction[[2, 2]] = 1.1;
    assert!(fit_vignette_radial(&correction.view(), None).is_err());
}

#[test]
fn test_evaluation_matches_pointwise_model() {
    let map = apply_vignette_radial((10, 14), &TRUE_PARAMS);
    for &(row, col) in &[(0usize, 0usize), (3, 7), (9, 13)] {
        let expected = vignette_radial((10, 14), col as f64, row as f64, &TRUE_PARAMS);
        assert_eq!(map[[row, col]], expected);
    }
}

#[test]
fn test_parameter_array_layout() {
    let fit = VignetteFit {
        params: TRUE_PARAMS,
        standard_errors: [0.002, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    };
    let stored = fit.to_array();
    assert_eq!(stored.dim(), (2, 7));
    assert_eq!(stored[[0, 5]], 0.55);
    assert_eq!(stored[[1, 0]], 0.002);
    assert_eq!(VignetteFit::from_array(&stored.view()).unwrap(), fit);
    assert_abs_diff_eq!(fit.relative_errors_percent()[0], 1.0, epsilon = 1e-12);
    assert!(VignetteFit::from_array(&Array2::<f64>::zeros((3, 7)).view()).is_err());
}
