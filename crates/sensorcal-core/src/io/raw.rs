//! RAW frame decoding through `rawloader` (DNG and the other formats it reads).

use std::path::Path;

use ndarray::Array2;
use rawloader::RawImageData;
use tracing::debug;

use crate::color::bayer::{BayerColour, BayerPattern};
use crate::error::{CalibrationError, Result};

/// Extensions treated as RAW files when stacking.
pub const RAW_EXTENSIONS: [&str; 8] = ["dng", "arw", "cr2", "nef", "orf", "raf", "rw2", "pef"];

/// A decoded sensor frame.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub data: Array2<u16>,
    pub pattern: BayerPattern,
}

pub fn is_raw_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RAW_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Decode a RAW file into its sensor values and colour pattern.
pub fn load_raw_frame(path: &Path) -> Result<RawFrame> {
    let decoded = rawloader::decode_file(path).map_err(|e| {
        CalibrationError::RawDecode(format!("{}: {e}", path.display()))
    })?;
    if decoded.cpp != 1 {
        return Err(CalibrationError::RawDecode(format!(
            "{}: expected one component per pixel, found {}",
            path.display(),
            decoded.cpp
        )));
    }

    let (width, height) = (decoded.width, decoded.height);
    let white_level = decoded.whitelevels.iter().copied().max().unwrap_or(u16::MAX);
    let values: Vec<u16> = match decoded.data {
        RawImageData::Integer(values) => values,
        RawImageData::Float(values) => float_counts(&values, white_level),
    };
    let data = Array2::from_shape_vec((height, width), values)?;

    let cell = [
        [decoded.cfa.color_at(0, 0), decoded.cfa.color_at(0, 1)],
        [decoded.cfa.color_at(1, 0), decoded.cfa.color_at(1, 1)],
    ];
    let pattern = BayerPattern::from_cell(rgbg2_cell(cell))?;
    debug!(
        "Decoded {} ({}x{}, {})",
        path.display(),
        width,
        height,
        pattern.name()
    );

    Ok(RawFrame { data, pattern })
}

/// Float samples are stored on the white-level scale; round them to counts
/// and clamp to `0..=white_level`.
fn float_counts(values: &[f32], white_level: u16) -> Vec<u16> {
    let white = f32::from(white_level);
    values
        .iter()
        .map(|&v| if v.is_finite() { v.round().clamp(0.0, white) as u16 } else { 0 })
        .collect()
}

/// Convert a decoder cell (0 R, 1 G, 2 B) to RGBG2 values: the green on the
/// blue row becomes G2.
fn rgbg2_cell(cell: [[usize; 2]; 2]) -> [[u8; 2]; 2] {
    let blue_row = cell
        .iter()
        .position(|row| row.contains(&BayerColour::Blue.index()))
        .unwrap_or(1);
    let mut out = [[0u8; 2]; 2];
    for (r, row) in cell.iter().enumerate() {
        for (c, &colour) in row.iter().enumerate() {
            out[r][c] = if colour == BayerColour::Green.index() && r == blue_row {
                BayerColour::Green2.index() as u8
            } else {
                colour as u8
            };
        }
    }
    out
}
