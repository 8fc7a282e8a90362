mod common;

use ndarray::Array2;

use common::CalibrationTree;
use sensorcal_core::io::image_io::load_rgb_image;
use sensorcal_core::plot::{
    gauss_maps_figure, histogram_figure, hstack, map_figure, rgb_histogram_figure, save_figure,
    ColorScale, Colormap,
};

#[test]
fn test_map_figure_saves_as_png() {
    let tree = CalibrationTree::new();
    let data = common::pseudo_random_map((20, 30), 1);
    let figure = map_figure(&data.view(), ColorScale::from_finite(data.iter()), Colormap::Viridis);
    assert_eq!(figure.nrows(), 20);
    assert!(figure.ncols() > 30);

    let path = tree.path("results/gain/map.png");
    save_figure(&figure, &path).unwrap();
    let back = load_rgb_image(&path).unwrap();
    assert_eq!(back.dim(), (20, figure.ncols(), 3));
}

#[test]
fn test_combined_difference_figure() {
    let mask = common::rggb_mask(16, 24);
    let mut data = common::pseudo_random_map((16, 24), 4).mapv(|v| v - 0.5);
    data[[0, 0]] = f64::NAN;

    let histogram = histogram_figure(data.iter(), (-0.5, 0.5), 50).unwrap();
    let rgb = rgb_histogram_figure(&data.view(), &mask.view(), (-0.5, 0.5), 50).unwrap();
    let maps = gauss_maps_figure(&data.view(), &mask.view(), 1.0, 0.1).unwrap();
    let combined = hstack(&[histogram.clone(), rgb, maps], 8);
    assert!(combined.ncols() > histogram.ncols());
    assert!(combined.nrows() >= histogram.nrows());
}

#[test]
fn test_histogram_rejects_zero_bins() {
    let data = Array2::<f64>::zeros((2, 2));
    assert!(histogram_figure(data.iter(), (0.0, 1.0), 0).is_err());
}
