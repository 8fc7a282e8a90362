use ndarray::{stack, Array2, ArrayD, ArrayView2, ArrayViewD, Axis, Slice};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::consts::BAYER_CHANNEL_COUNT;
use crate::error::{CalibrationError, Result};

/// Filter colour under a pixel, numbered as in the colour mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayerColour {
    Red = 0,
    Green = 1,
    Blue = 2,
    Green2 = 3,
}

impl BayerColour {
    pub const ALL: [BayerColour; BAYER_CHANNEL_COUNT] =
        [Self::Red, Self::Green, Self::Blue, Self::Green2];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for BayerColour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "R"),
            Self::Green => write!(f, "G"),
            Self::Blue => write!(f, "B"),
            Self::Green2 => write!(f, "G2"),
        }
    }
}

/// The repeating 2x2 colour-filter cell of a sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BayerPattern {
    /// `(row_parity, col_parity)` of each colour, indexed by mask value.
    offsets: [(usize, usize); BAYER_CHANNEL_COUNT],
}

impl BayerPattern {
    /// Build from a 2x2 cell of mask values.
    pub fn from_cell(cell: [[u8; 2]; 2]) -> Result<Self> {
        let mut offsets = [None; BAYER_CHANNEL_COUNT];
        for (row, values) in cell.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                let slot = offsets.get_mut(value as usize).ok_or_else(|| {
                    CalibrationError::InvalidBayerMask(format!("unexpected value {value}"))
                })?;
                if slot.is_some() {
                    return Err(CalibrationError::InvalidBayerMask(format!(
                        "value {value} appears twice in the 2x2 cell"
                    )));
                }
                *slot = Some((row, col));
            }
        }
        // Four slots filled by four distinct values: every colour is present.
        let offsets = offsets.map(|o| o.unwrap_or_default());
        Ok(Self { offsets })
    }

    /// Parse a pattern name such as `RGGB`. The green sharing a row with blue is G2.
    pub fn from_name(name: &str) -> Option<Self> {
        let cell = match name.to_ascii_uppercase().as_str() {
            "RGGB" => [[0, 1], [3, 2]],
            "BGGR" => [[2, 3], [1, 0]],
            "GRBG" => [[1, 0], [2, 3]],
            "GBRG" => [[3, 2], [0, 1]],
            _ => return None,
        };
        Self::from_cell(cell).ok()
    }

    /// Derive the pattern from a full colour mask, checking that the mask
    /// repeats the same 2x2 cell everywhere.
    pub fn from_mask(mask: &ArrayView2<u8>) -> Result<Self> {
        let (h, w) = mask.dim();
        if h < 2 || w < 2 || h % 2 != 0 || w % 2 != 0 {
            return Err(CalibrationError::InvalidBayerMask(format!(
                "mask shape {h}x{w} is not a whole number of 2x2 cells"
            )));
        }

        let cell = [[mask[[0, 0]], mask[[0, 1]]], [mask[[1, 0]], mask[[1, 1]]]];
        let pattern = Self::from_cell(cell)?;

        for ((row, col), &value) in mask.indexed_iter() {
            if value != cell[row % 2][col % 2] {
                return Err(CalibrationError::InvalidBayerMask(format!(
                    "value {value} at ({row}, {col}) breaks the 2x2 pattern"
                )));
            }
        }
        Ok(pattern)
    }

    /// Position of `colour` within the 2x2 cell.
    pub fn offset(&self, colour: BayerColour) -> (usize, usize) {
        self.offsets[colour.index()]
    }

    /// Expand to a full-size colour mask.
    pub fn mask(&self, height: usize, width: usize) -> Array2<u8> {
        let mut cell = [[0u8; 2]; 2];
        for colour in BayerColour::ALL {
            let (r, c) = self.offset(colour);
            cell[r][c] = colour as u8;
        }
        Array2::from_shape_fn((height, width), |(r, c)| cell[r % 2][c % 2])
    }

    /// Pattern name, e.g. `RGGB`.
    pub fn name(&self) -> String {
        let mut letters = [' '; 4];
        for colour in BayerColour::ALL {
            let (r, c) = self.offset(colour);
            letters[2 * r + c] = match colour {
                BayerColour::Red => 'R',
                BayerColour::Blue => 'B',
                _ => 'G',
            };
        }
        letters.iter().collect()
    }
}

fn check_spatial_shape(data_shape: &[usize], mask: &ArrayView2<u8>) -> Result<()> {
    let nd = data_shape.len();
    if nd < 2 || data_shape[nd - 2..] != [mask.nrows(), mask.ncols()] {
        return Err(CalibrationError::ShapeMismatch {
            left: data_shape.to_vec(),
            right: mask.shape().to_vec(),
        });
    }
    Ok(())
}

/// Split `data` (trailing two axes spatial) into its four Bayer channels.
///
/// Returns an array of shape `(4, ..., H/2, W/2)`, ordered R, G, B, G2.
pub fn pull_apart<A: Clone>(data: &ArrayViewD<A>, mask: &ArrayView2<u8>) -> Result<ArrayD<A>> {
    check_spatial_shape(data.shape(), mask)?;
    let pattern = BayerPattern::from_mask(mask)?;
    let nd = data.ndim();

    let channels: Vec<_> = BayerColour::ALL
        .iter()
        .map(|&colour| {
            let (r0, c0) = pattern.offset(colour);
            data.slice_each_axis(|ax| match ax.axis.index() {
                i if i == nd - 2 => Slice::new(r0 as isize, None, 2),
                i if i == nd - 1 => Slice::new(c0 as isize, None, 2),
                _ => Slice::from(..),
            })
        })
        .collect();

    Ok(stack(Axis(0), &channels)?)
}

/// Interleave four Bayer channels (shape `(4, ..., H/2, W/2)`) back into a mosaic.
pub fn put_together<A: Clone + Zero>(
    rgbg: &ArrayViewD<A>,
    mask: &ArrayView2<u8>,
) -> Result<ArrayD<A>> {
    let shape = rgbg.shape();
    if shape.len() < 3 || shape[0] != BAYER_CHANNEL_COUNT {
        return Err(CalibrationError::ShapeMismatch {
            left: shape.to_vec(),
            right: vec![BAYER_CHANNEL_COUNT],
        });
    }

    let mut full_shape = shape[1..].to_vec();
    let nd = full_shape.len();
    full_shape[nd - 2] *= 2;
    full_shape[nd - 1] *= 2;
    check_spatial_shape(&full_shape, mask)?;
    let pattern = BayerPattern::from_mask(mask)?;

    let mut out = ArrayD::<A>::zeros(full_shape);
    for colour in BayerColour::ALL {
        let (r0, c0) = pattern.offset(colour);
        out.slice_each_axis_mut(|ax| match ax.axis.index() {
            i if i == nd - 2 => Slice::new(r0 as isize, None, 2),
            i if i == nd - 1 => Slice::new(c0 as isize, None, 2),
            _ => Slice::from(..),
        })
        .assign(&rgbg.index_axis(Axis(0), colour.index()));
    }
    Ok(out)
}

/// Finite values of an RGBG split grouped as R, G (G and G2 combined), B.
pub fn rgb_values(rgbg: &ArrayViewD<f64>) -> [Vec<f64>; 3] {
    let finite = |c: BayerColour| -> Vec<f64> {
        rgbg.index_axis(Axis(0), c.index())
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect()
    };
    let mut green = finite(BayerColour::Green);
    green.extend(finite(BayerColour::Green2));
    [finite(BayerColour::Red), green, finite(BayerColour::Blue)]
}
