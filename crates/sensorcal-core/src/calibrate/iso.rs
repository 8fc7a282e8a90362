use std::path::Path;

use ndarray::{Array2, ArrayView2, Ix2};

use crate::error::{CalibrationError, Result};
use crate::io::npy::read_npy;

/// ISO lookup table inside `products`.
pub const ISO_LOOKUP_FILE: &str = "iso_normalisation_lookup_table.npy";

/// Normalisation factor for each ISO speed.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoLookupTable {
    isos: Vec<f64>,
    factors: Vec<f64>,
}

impl IsoLookupTable {
    /// From a `2 × N` array: row 0 ISO speeds, row 1 normalisation factors.
    pub fn from_array(table: &ArrayView2<f64>) -> Result<Self> {
        if table.nrows() != 2 || table.ncols() == 0 {
            return Err(CalibrationError::ShapeMismatch {
                left: table.shape().to_vec(),
                right: vec![2, table.ncols().max(1)],
            });
        }
        Ok(Self {
            isos: table.row(0).to_vec(),
            factors: table.row(1).to_vec(),
        })
    }

    pub fn factor(&self, iso: u32) -> Result<f64> {
        self.isos
            .iter()
            .position(|&v| v == iso as f64)
            .map(|i| self.factors[i])
            .ok_or_else(|| {
                CalibrationError::InvalidParameter(format!("ISO {iso} is not in the lookup table"))
            })
    }
}

pub fn load_iso_lookup_table(products: &Path) -> Result<IsoLookupTable> {
    let table = read_npy(&products.join(ISO_LOOKUP_FILE))?.into_dimensionality::<Ix2>()?;
    IsoLookupTable::from_array(&table.view())
}

/// Divide each map by the normalisation factor of its ISO speed.
pub fn normalise_iso(table: &IsoLookupTable, data: &[Array2<f64>], isos: &[u32]) -> Result<Vec<Array2<f64>>> {
    if data.len() != isos.len() {
        return Err(CalibrationError::ShapeMismatch {
            left: vec![data.len()],
            right: vec![isos.len()],
        });
    }
    data.iter()
        .zip(isos)
        .map(|(map, &iso)| {
            let factor = table.factor(iso)?;
            Ok(map / factor)
        })
        .collect()
}
