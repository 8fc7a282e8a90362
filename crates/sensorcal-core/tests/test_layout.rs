mod common;

use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;

use common::CalibrationTree;
use sensorcal_core::io::filename::{split_exposure_time, split_iso, split_pol_angle, stack_label};
use sensorcal_core::io::layout::{files_with_suffix, replace_word_in_path};
use sensorcal_core::io::{find_root_folder, CalibrationFolders};

#[test]
fn test_iso_from_filename() {
    assert_eq!(split_iso(Path::new("stacks/bias/bias_iso800_mean.npy")).unwrap(), 800);
    assert_eq!(split_iso(Path::new("iso100.npy")).unwrap(), 100);
    assert!(split_iso(Path::new("bias_mean.npy")).is_err());
    assert!(split_iso(Path::new("isoABC_mean.npy")).is_err());
}

#[test]
fn test_exposure_time_from_filename() {
    assert_abs_diff_eq!(split_exposure_time(Path::new("t_1_1000.dng")).unwrap(), 0.001);
    assert_abs_diff_eq!(split_exposure_time(Path::new("t_5.dng")).unwrap(), 5.0);
    assert_abs_diff_eq!(split_exposure_time(Path::new("t_1_250_mean.npy")).unwrap(), 0.004);
    assert_abs_diff_eq!(split_exposure_time(Path::new("t_2_jstds.npy")).unwrap(), 2.0);
    assert!(split_exposure_time(Path::new("flat.dng")).is_err());
}

#[test]
fn test_polariser_angle_from_filename() {
    assert_abs_diff_eq!(split_pol_angle(Path::new("pol42.5_mean.npy")).unwrap(), 42.5);
    assert_abs_diff_eq!(split_pol_angle(Path::new("pol90_stds.npy")).unwrap(), 90.0);
}

#[test]
fn test_stack_labels() {
    assert_eq!(stack_label(Path::new("stacks/flat/flat_iso100_mean.npy")), "flat_iso100");
    assert_eq!(stack_label(Path::new("iso200_stds.npy")), "iso200");
}

#[test]
fn test_root_is_parent_of_nearest_layout_folder() {
    let root = Path::new("/data/camera");
    assert_eq!(
        find_root_folder(&root.join("stacks/bias/iso100_mean.npy")).unwrap(),
        root
    );
    assert_eq!(find_root_folder(&root.join("images/flat/a.dng")).unwrap(), root);
    assert_eq!(find_root_folder(&root.join("results")).unwrap(), root);
    assert!(find_root_folder(Path::new("/data/elsewhere/file.npy")).is_err());
}

#[test]
fn test_nested_layout_names_use_the_nearest() {
    let path = Path::new("/a/images/b/stacks/c/file.npy");
    assert_eq!(find_root_folder(path).unwrap(), PathBuf::from("/a/images/b"));
}

#[test]
fn test_folders_from_any_inner_path() {
    let folders = CalibrationFolders::from_path(Path::new("/cam/products/readnoise.npy")).unwrap();
    assert_eq!(folders.root, PathBuf::from("/cam"));
    assert_eq!(folders.stacks, PathBuf::from("/cam/stacks"));
    assert_eq!(folders.results, PathBuf::from("/cam/results"));
}

#[test]
fn test_results_dir_is_created() {
    let tree = CalibrationTree::new();
    let folders = CalibrationFolders::from_root(tree.root());
    let dir = folders.results_dir("flatfield").unwrap();
    assert!(dir.is_dir());
    assert_eq!(dir, tree.path("results/flatfield"));
}

#[test]
fn test_replace_word_in_path() {
    assert_eq!(
        replace_word_in_path(Path::new("/cam/images/flat/iso100"), "images", "stacks"),
        Some(PathBuf::from("/cam/stacks/flat/iso100"))
    );
    assert_eq!(replace_word_in_path(Path::new("/cam/flat"), "images", "stacks"), None);
}

#[test]
fn test_listing_is_sorted_and_filtered() {
    let tree = CalibrationTree::new();
    for name in ["b_mean.npy", "a_mean.npy", "a_stds.npy", "notes.txt"] {
        std::fs::write(tree.path("stacks").join(name), b"").unwrap();
    }
    let files = files_with_suffix(&tree.path("stacks"), "_mean.npy").unwrap();
    let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
    assert_eq!(names, vec!["a_mean.npy", "b_mean.npy"]);
}
