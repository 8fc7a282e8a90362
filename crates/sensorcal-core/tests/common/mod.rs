#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayBase, Data, Dimension};
use tempfile::TempDir;

use sensorcal_core::color::bayer::BayerPattern;
use sensorcal_core::io::loaders::COLOUR_FILE;
use sensorcal_core::io::npy::{write_npy, NpyElement};

/// A throwaway calibration root with the four standard sub-folders.
pub struct CalibrationTree {
    pub dir: TempDir,
}

impl CalibrationTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["images", "stacks", "products", "results"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write an array at `relative`, creating parent folders.
    pub fn write<T, S, D>(&self, relative: &str, array: &ArrayBase<S, D>) -> PathBuf
    where
        T: NpyElement,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_npy(&path, array).unwrap();
        path
    }

    /// Write an RGGB colour mask of the given shape to `stacks/colour.npy`.
    pub fn write_colour(&self, height: usize, width: usize) -> Array2<u8> {
        let mask = rggb_mask(height, width);
        self.write(&format!("stacks/{COLOUR_FILE}"), &mask);
        mask
    }
}

pub fn rggb_mask(height: usize, width: usize) -> Array2<u8> {
    BayerPattern::from_name("RGGB").unwrap().mask(height, width)
}

/// Deterministic pseudo-random values in `[0, 1)` (LCG), enough for tests.
pub fn pseudo_random(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

pub fn pseudo_random_map(shape: (usize, usize), seed: u64) -> Array2<f64> {
    Array2::from_shape_vec(shape, pseudo_random(shape.0 * shape.1, seed)).unwrap()
}
