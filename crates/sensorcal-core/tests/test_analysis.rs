mod common;

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, Axis};

use common::CalibrationTree;
use sensorcal_core::analyse::gain::GainAnalysis;
use sensorcal_core::analyse::linearity::{linear_fit, linearity_r2, malus, r_squared};
use sensorcal_core::analyse::spectral::{
    read_spectral_bandwidths, read_spectral_responses, write_spectral_bandwidths, CURVE_FILE,
    MONOCHROMATOR_CURVE_FILE,
};
use sensorcal_core::analyse::{rms, Statistics, StatisticsTable};
use sensorcal_core::io::filename::split_pol_angle;
use sensorcal_core::io::load_means;
use sensorcal_core::CalibrationConfig;

/// Nine rows: wavelengths, four responses, four errors.
fn response_table(peak: f64) -> Array2<f64> {
    let wavelengths = Array1::<f64>::linspace(400.0, 700.0, 31);
    Array2::from_shape_fn((9, 31), |(row, i)| match row {
        0 => wavelengths[i],
        1..=4 => peak * (-((wavelengths[i] - 550.0) / 40.0).powi(2)).exp(),
        _ => 0.01,
    })
}

#[test]
fn test_spectral_prefers_monochromator_data() {
    let tree = CalibrationTree::new();
    tree.write(&format!("results/{CURVE_FILE}"), &response_table(1.0));
    tree.write(&format!("results/{MONOCHROMATOR_CURVE_FILE}"), &response_table(2.0));

    let response = read_spectral_responses(&tree.path("results")).unwrap();
    assert_eq!(response.source, tree.path("results").join(MONOCHROMATOR_CURVE_FILE));
    assert_eq!(response.responses.dim(), (4, 31));
    assert_abs_diff_eq!(response.responses[[0, 15]], 2.0, epsilon = 1e-12);
}

#[test]
fn test_spectral_falls_back_when_missing() {
    let tree = CalibrationTree::new();
    tree.write(&format!("results/{CURVE_FILE}"), &response_table(1.0));
    let response = read_spectral_responses(&tree.path("results")).unwrap();
    assert_eq!(response.source, tree.path("results").join(CURVE_FILE));

    // A Gaussian of width 40 integrates to 40 √π over its peak.
    let expected = 40.0 * std::f64::consts::PI.sqrt();
    for bandwidth in response.bandwidths() {
        assert_abs_diff_eq!(bandwidth, expected, epsilon = 0.5);
    }
}

#[test]
fn test_spectral_fails_without_either_file() {
    let tree = CalibrationTree::new();
    assert!(read_spectral_responses(&tree.path("results")).is_err());
}

#[test]
fn test_broken_preferred_file_is_not_skipped() {
    let tree = CalibrationTree::new();
    tree.write(&format!("results/{CURVE_FILE}"), &response_table(1.0));
    tree.write(&format!("results/{MONOCHROMATOR_CURVE_FILE}"), &Array2::<f64>::zeros((3, 5)));
    assert!(read_spectral_responses(&tree.path("results")).is_err());
}

#[test]
fn test_bandwidths_written_and_read() {
    let tree = CalibrationTree::new();
    let bandwidths = [71.5, 90.25, 65.0, 89.75];
    write_spectral_bandwidths(&tree.path("products"), &bandwidths).unwrap();
    assert_eq!(read_spectral_bandwidths(&tree.path("products")).unwrap(), bandwidths);
}

#[test]
fn test_linear_response_has_unit_r2() {
    let tree = CalibrationTree::new();
    let mask = tree.write_colour(4, 6);
    let offset = 12.0;
    for angle in [0, 20, 40, 60, 80, 100] {
        let intensity = malus(angle as f64, offset);
        let mean = Array2::from_shape_fn((4, 6), |(r, c)| {
            let dark = 100.0 + (r * 6 + c) as f64;
            // One pixel saturates at high intensity.
            if (r, c) == (0, 0) && intensity > 0.8 {
                4095.0
            } else {
                dark + 3000.0 * intensity
            }
        });
        tree.write(&format!("stacks/linearity/pol{angle}_mean.npy"), &mean);
    }

    let (angles, means) = load_means(&tree.path("stacks/linearity"), split_pol_angle).unwrap();
    assert_eq!(angles.len(), 6);
    let r2 = linearity_r2(&angles, offset, &means, &mask.view(), 4000.0).unwrap();
    assert_eq!(r2.dim(), (4, 6));
    for &v in r2.iter() {
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_nonlinear_response_lowers_r2() {
    let x: Vec<f64> = (0..10).map(|i| i as f64 / 9.0).collect();
    let y: Vec<f64> = x.iter().map(|v| v * v).collect();
    let (slope, intercept) = linear_fit(&x, &y).unwrap();
    let predicted: Vec<f64> = x.iter().map(|v| slope * v + intercept).collect();
    let r2 = r_squared(&y, &predicted);
    assert!(r2 < 0.99 && r2 > 0.8);
    assert!(linear_fit(&[1.0], &[1.0]).is_none());
    assert!(linear_fit(&[2.0, 2.0], &[1.0, 3.0]).is_none());
}

#[test]
fn test_mismatched_linearity_inputs() {
    let mask = common::rggb_mask(2, 2);
    let means = vec![Array2::<f64>::zeros((2, 2))];
    assert!(linearity_r2(&[0.0, 10.0], 0.0, &means, &mask.view(), 4000.0).is_err());
    assert!(linearity_r2(&[], 0.0, &[], &mask.view(), 4000.0).is_err());
}

#[test]
fn test_statistics_of_known_values() {
    let mut values: Vec<f64> = (1..=1001).map(|v| v as f64).collect();
    values.push(f64::NAN);
    let stats = Statistics::from_values(&values).unwrap();
    assert_eq!(stats.count, 1001);
    assert_eq!(stats.mean, 501.0);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.median, 501.0);
    assert_eq!(stats.max, 1001.0);
    assert_abs_diff_eq!(stats.p0_1, 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.p99_9, 1000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.std, (1001.0f64 * 1001.0 - 1.0).sqrt() / 12f64.sqrt(), epsilon = 1e-9);

    let mut table = StatisticsTable::new("ISO");
    table.push("100", stats);
    let rendered = table.to_string();
    assert!(rendered.lines().next().unwrap().contains("median"));
    assert!(rendered.lines().nth(1).unwrap().trim_start().starts_with("100"));
}

#[test]
fn test_rms_ignores_nan() {
    assert_abs_diff_eq!(rms(&[3.0, -4.0, f64::NAN]).unwrap(), 12.5f64.sqrt(), epsilon = 1e-12);
    assert!(rms(&[f64::NAN]).is_err());
}

#[test]
fn test_gain_channels_keep_their_levels() {
    let mask = common::rggb_mask(16, 16);
    let levels = [1.0, 2.0, 3.0, 2.0];
    let gains = mask.mapv(|m| levels[m as usize]);
    let analysis = GainAnalysis::new(&gains.view(), &mask.view(), &CalibrationConfig::default()).unwrap();
    for (c, channel) in analysis.rgbg_smoothed.axis_iter(Axis(0)).enumerate() {
        assert!(channel.iter().all(|v| (v - levels[c]).abs() < 1e-12));
    }
    let (low, high) = analysis.value_range(0.1).unwrap();
    assert_abs_diff_eq!(low, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(high, 3.0, epsilon = 1e-9);
    let (lo, hi) = analysis.display_range;
    assert_abs_diff_eq!(lo, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(hi, 3.0, epsilon = 1e-9);
}
