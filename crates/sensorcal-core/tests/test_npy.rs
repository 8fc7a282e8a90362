use std::path::Path;

use ndarray::{array, Array2, Array3, Ix2, Ix3};
use tempfile::tempdir;

use sensorcal_core::io::npy::{read_npy, read_npy_u8, write_npy, NpyDtype, NpyReader};

/// A raw `.npy` file with the given header dict and payload.
fn write_raw_npy(path: &Path, major: u8, dict: &str, payload: &[u8]) {
    let mut header = dict.to_string();
    let preamble = if major == 1 { 10 } else { 12 };
    while (preamble + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');

    let mut bytes = b"\x93NUMPY".to_vec();
    bytes.extend_from_slice(&[major, 0]);
    if major == 1 {
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    } else {
        bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
    }
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(payload);
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_write_then_read_f64() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.npy");
    let data = array![[1.5, -2.0, f64::NAN], [0.0, 1e-300, 7.25]];
    write_npy(&path, &data).unwrap();

    let reader = NpyReader::open(&path).unwrap();
    assert_eq!(reader.header.dtype, NpyDtype::F64);
    assert_eq!(reader.header.shape, vec![2, 3]);
    assert_eq!(reader.header.data_offset % 64, 0);

    let back = read_npy(&path).unwrap().into_dimensionality::<Ix2>().unwrap();
    assert!(back[[0, 2]].is_nan());
    assert_eq!(back[[0, 0]], 1.5);
    assert_eq!(back[[1, 1]], 1e-300);
    assert_eq!(back[[1, 2]], 7.25);
}

#[test]
fn test_f32_and_u16_are_widened() {
    let dir = tempdir().unwrap();
    let f32_path = dir.path().join("mean.npy");
    write_npy(&f32_path, &Array3::<f32>::from_elem((2, 3, 3), 0.5)).unwrap();
    let mean = read_npy(&f32_path).unwrap().into_dimensionality::<Ix3>().unwrap();
    assert_eq!(mean.dim(), (2, 3, 3));
    assert_eq!(mean[[1, 2, 2]], 0.5);

    let u16_path = dir.path().join("raw.npy");
    write_npy(&u16_path, &array![[0u16, 4095], [65535, 12]]).unwrap();
    let raw = read_npy(&u16_path).unwrap();
    assert_eq!(raw[[1, 0]], 65535.0);
}

#[test]
fn test_colour_mask_as_u8() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("colour.npy");
    let mask = array![[0u8, 1], [3, 2]];
    write_npy(&path, &mask).unwrap();
    let back = read_npy_u8(&path).unwrap().into_dimensionality::<Ix2>().unwrap();
    assert_eq!(back, mask);

    let float_path = dir.path().join("float.npy");
    write_npy(&float_path, &Array2::<f64>::zeros((2, 2))).unwrap();
    assert!(read_npy_u8(&float_path).is_err());
}

#[test]
fn test_integer_mask_wider_than_u8() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("colour.npy");
    let payload: Vec<u8> = [0i64, 1, 3, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
    write_raw_npy(&path, 1, "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2), }", &payload);
    let mask = read_npy_u8(&path).unwrap();
    assert_eq!(mask.into_raw_vec_and_offset().0, vec![0, 1, 3, 2]);
}

#[test]
fn test_big_endian_and_version_two() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("be.npy");
    let payload: Vec<u8> = [1.0f64, -3.5].iter().flat_map(|v| v.to_be_bytes()).collect();
    write_raw_npy(&path, 2, "{'descr': '>f8', 'fortran_order': False, 'shape': (2,), }", &payload);
    let reader = NpyReader::open(&path).unwrap();
    assert_eq!(reader.header.version, (2, 0));
    assert!(!reader.header.little_endian);
    let values = reader.to_f64().unwrap();
    assert_eq!(values.into_raw_vec_and_offset().0, vec![1.0, -3.5]);
}

#[test]
fn test_fortran_order_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("f.npy");
    let payload = [0u8; 32];
    write_raw_npy(&path, 1, "{'descr': '<f8', 'fortran_order': True, 'shape': (2, 2), }", &payload);
    assert!(NpyReader::open(&path).is_err());
}

#[test]
fn test_truncated_and_foreign_files_are_rejected() {
    let dir = tempdir().unwrap();
    let short = dir.path().join("short.npy");
    write_raw_npy(&short, 1, "{'descr': '<f8', 'fortran_order': False, 'shape': (4, 4), }", &[0u8; 16]);
    assert!(read_npy(&short).is_err());

    let foreign = dir.path().join("foreign.npy");
    std::fs::write(&foreign, b"not an array file at all, just text").unwrap();
    assert!(read_npy(&foreign).is_err());

    let complex = dir.path().join("complex.npy");
    write_raw_npy(&complex, 1, "{'descr': '<c16', 'fortran_order': False, 'shape': (1,), }", &[0u8; 16]);
    assert!(read_npy(&complex).is_err());
}
