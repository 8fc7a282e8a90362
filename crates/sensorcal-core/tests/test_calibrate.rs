mod common;

use ndarray::{array, Array2, Ix2};

use common::CalibrationTree;
use sensorcal_core::calibrate::bias::BIAS_FILE;
use sensorcal_core::calibrate::iso::ISO_LOOKUP_FILE;
use sensorcal_core::calibrate::readnoise::READNOISE_FILE;
use sensorcal_core::calibrate::{
    correct_bias, load_iso_lookup_table, normalise_iso, save_readnoise_map, select_lowest_iso,
};
use sensorcal_core::io::filename::split_iso;
use sensorcal_core::io::{load_stds, read_npy};

#[test]
fn test_lowest_iso_map_is_persisted() {
    let tree = CalibrationTree::new();
    for iso in [3200u32, 100, 400, 200] {
        let map = Array2::from_elem((4, 4), iso as f64 / 100.0);
        tree.write(&format!("stacks/bias/iso{iso}_stds.npy"), &map);
    }

    let (isos, stds) = load_stds(&tree.path("stacks/bias"), split_iso).unwrap();
    assert_eq!(isos, vec![100, 200, 3200, 400]);

    let (iso, path) = save_readnoise_map(&tree.path("products"), &isos, &stds).unwrap();
    assert_eq!(iso, 100);
    assert_eq!(path, tree.path("products").join(READNOISE_FILE));
    let saved = read_npy(&path).unwrap().into_dimensionality::<Ix2>().unwrap();
    assert_eq!(saved, Array2::from_elem((4, 4), 1.0));
}

#[test]
fn test_ties_pick_the_first_map() {
    assert_eq!(select_lowest_iso(&[100, 200, 400, 3200]).unwrap(), 0);
    assert_eq!(select_lowest_iso(&[200, 100, 100]).unwrap(), 1);
}

#[test]
fn test_mismatched_inputs_are_rejected() {
    let tree = CalibrationTree::new();
    let stds = vec![Array2::<f64>::zeros((2, 2))];
    assert!(save_readnoise_map(&tree.path("products"), &[100, 200], &stds).is_err());
    assert!(save_readnoise_map(&tree.path("products"), &[], &[]).is_err());
}

#[test]
fn test_bias_is_subtracted() {
    let tree = CalibrationTree::new();
    tree.write(&format!("products/{BIAS_FILE}"), &array![[512.0, 510.0], [509.0, 511.0]]);
    let data = array![[600.0, 600.0], [600.0, 600.0]];
    let corrected = correct_bias(&tree.path("products"), &data.view()).unwrap();
    assert_eq!(corrected, array![[88.0, 90.0], [91.0, 89.0]]);

    let wrong = Array2::<f64>::zeros((3, 2));
    assert!(correct_bias(&tree.path("products"), &wrong.view()).is_err());
}

#[test]
fn test_missing_bias_fails() {
    let tree = CalibrationTree::new();
    let data = Array2::<f64>::zeros((2, 2));
    assert!(correct_bias(&tree.path("products"), &data.view()).is_err());
}

#[test]
fn test_iso_normalisation_from_products() {
    let tree = CalibrationTree::new();
    tree.write(
        &format!("products/{ISO_LOOKUP_FILE}"),
        &array![[100.0, 200.0, 400.0], [1.0, 2.0, 4.0]],
    );
    let table = load_iso_lookup_table(&tree.path("products")).unwrap();
    assert_eq!(table.factor(400).unwrap(), 4.0);

    let data = vec![Array2::from_elem((2, 2), 8.0), Array2::from_elem((2, 2), 8.0)];
    let normalised = normalise_iso(&table, &data, &[200, 400]).unwrap();
    assert_eq!(normalised[0][[0, 0]], 4.0);
    assert_eq!(normalised[1][[1, 1]], 2.0);
    assert!(normalise_iso(&table, &data, &[800, 100]).is_err());
}
