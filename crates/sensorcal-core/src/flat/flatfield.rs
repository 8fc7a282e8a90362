use std::path::{Path, PathBuf};

use ndarray::{s, Array2, ArrayView2, Axis, Ix2};
use tracing::{debug, info};

use crate::color::bayer::{pull_apart, put_together};
use crate::config::CalibrationConfig;
use crate::error::{CalibrationError, Result};
use crate::filters::gaussian::{gauss_filter, Sigma};
use crate::flat::vignette::{apply_vignette_radial, fit_vignette_radial, VignetteFit};
use crate::io::npy::{read_npy, write_npy};

/// Saved vignetting parameters inside `products`.
pub const FLATFIELD_PARAMETERS_FILE: &str = "flatfield_parameters.npy";
/// Saved modelled correction map inside `products`.
pub const FLATFIELD_MODELLED_FILE: &str = "flatfield_correction_modelled.npy";

/// Make everything within `border` pixels of the edge NaN.
pub fn clip_data(data: &ArrayView2<f64>, border: usize) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut clipped = Array2::from_elem((h, w), f64::NAN);
    if h > 2 * border && w > 2 * border {
        let inner = s![border..h - border, border..w - border];
        clipped.slice_mut(inner).assign(&data.slice(inner));
    }
    clipped
}

/// Normalise each Bayer channel of a flat field to a maximum of 1.
///
/// The maximum is taken after Gaussian smoothing (`sigma` within each
/// channel) so that single outliers do not set the scale. `stds` is scaled
/// by the same per-channel factors.
pub fn normalise_rgbg2(
    mean: &ArrayView2<f64>,
    stds: &ArrayView2<f64>,
    mask: &ArrayView2<u8>,
    sigma: f64,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let mut mean_rgbg = pull_apart(&mean.into_dyn(), mask)?;
    let mut stds_rgbg = pull_apart(&stds.into_dyn(), mask)?;

    let smoothed = gauss_filter(&mean_rgbg.view(), &Sigma::from([0.0, sigma, sigma]))?;
    let factors: Vec<f64> = smoothed
        .axis_iter(Axis(0))
        .map(|channel| channel.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect();
    debug!("Flat-field normalisation factors: {:?}", factors);

    for (c, factor) in factors.iter().enumerate() {
        mean_rgbg.index_axis_mut(Axis(0), c).mapv_inplace(|v| v / factor);
        stds_rgbg.index_axis_mut(Axis(0), c).mapv_inplace(|v| v / factor);
    }

    let mean = put_together(&mean_rgbg.view(), mask)?.into_dimensionality::<Ix2>()?;
    let stds = put_together(&stds_rgbg.view(), mask)?.into_dimensionality::<Ix2>()?;
    Ok((mean, stds))
}

/// Multiply `data` by a flat-field correction map, optionally clipping the border first.
pub fn correct_flatfield_from_map(
    flatfield: &ArrayView2<f64>,
    data: &ArrayView2<f64>,
    clip_border: Option<usize>,
) -> Result<Array2<f64>> {
    if flatfield.dim() != data.dim() {
        return Err(CalibrationError::ShapeMismatch {
            left: flatfield.shape().to_vec(),
            right: data.shape().to_vec(),
        });
    }
    let data = match clip_border {
        Some(border) => clip_data(data, border),
        None => data.to_owned(),
    };
    Ok(data * flatfield)
}

/// `map1 - map2` for two correction maps of equal shape.
pub fn difference_map(map1: &ArrayView2<f64>, map2: &ArrayView2<f64>) -> Result<Array2<f64>> {
    if map1.dim() != map2.dim() {
        return Err(CalibrationError::ShapeMismatch {
            left: map1.shape().to_vec(),
            right: map2.shape().to_vec(),
        });
    }
    Ok(map1 - map2)
}

/// Two correction maps with the border clipped, and their difference.
#[derive(Clone, Debug)]
pub struct MapComparison {
    pub map1: Array2<f64>,
    pub map2: Array2<f64>,
    pub difference: Array2<f64>,
}

impl MapComparison {
    /// Modelled maps cover the whole sensor, so both are clipped by `border`
    /// before differencing.
    pub fn new(map1: &ArrayView2<f64>, map2: &ArrayView2<f64>, border: usize) -> Result<Self> {
        let map1 = clip_data(map1, border);
        let map2 = clip_data(map2, border);
        let difference = difference_map(&map1.view(), &map2.view())?;
        Ok(Self {
            map1,
            map2,
            difference,
        })
    }
}

/// Rebuild the correction map for `shape` from the saved model parameters.
pub fn read_flat_field_correction(products: &Path, shape: (usize, usize)) -> Result<Array2<f64>> {
    let stored = read_npy(&products.join(FLATFIELD_PARAMETERS_FILE))?.into_dimensionality::<Ix2>()?;
    let fit = VignetteFit::from_array(&stored.view())?;
    Ok(apply_vignette_radial(shape, &fit.params))
}

/// Load the saved modelled correction map.
pub fn load_flat_field_correction_map(products: &Path) -> Result<(Array2<f64>, PathBuf)> {
    let path = products.join(FLATFIELD_MODELLED_FILE);
    let map = read_npy(&path)?.into_dimensionality::<Ix2>()?;
    Ok((map, path))
}

/// Everything derived from one mean flat-field stack.
#[derive(Clone, Debug)]
pub struct FlatFieldProducts {
    /// `1 / flat` from the smoothed, clipped, normalised flat field.
    pub correction: Array2<f64>,
    /// `1 / flat` from the unsmoothed, clipped, normalised flat field.
    pub correction_raw: Array2<f64>,
    pub fit: VignetteFit,
    /// Fitted model evaluated over the full frame.
    pub correction_modelled: Array2<f64>,
}

impl FlatFieldProducts {
    /// Write all maps and the parameters into `products`, named after `label`.
    ///
    /// The parameters and modelled map are also written under their unlabelled
    /// names, which the correction readers use.
    pub fn save(&self, products: &Path, label: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(products)?;
        let parameters = self.fit.to_array();
        let outputs = [
            (format!("flatfield_correction_{label}.npy"), &self.correction),
            (format!("flatfield_correction_{label}_raw.npy"), &self.correction_raw),
            (format!("flatfield_correction_{label}_modelled.npy"), &self.correction_modelled),
            (format!("flat_{label}_parameters.npy"), &parameters),
            (FLATFIELD_MODELLED_FILE.to_string(), &self.correction_modelled),
            (FLATFIELD_PARAMETERS_FILE.to_string(), &parameters),
        ];
        let mut written = Vec::with_capacity(outputs.len());
        for (name, map) in outputs {
            let path = products.join(name);
            write_npy(&path, map)?;
            written.push(path);
        }
        debug!("Saved flat-field products: {:?}", written);
        Ok(written)
    }
}

/// Derive flat-field correction maps and the vignetting model.
///
/// Order matters: bias is removed before each channel is normalised, the
/// normalised map is smoothed, then both the smoothed and unsmoothed maps
/// are clipped and inverted. The model is fitted to the smoothed map.
pub fn build_flat_field(
    mean: &ArrayView2<f64>,
    stds: &ArrayView2<f64>,
    bias: Option<&ArrayView2<f64>>,
    mask: &ArrayView2<u8>,
    config: &CalibrationConfig,
) -> Result<FlatFieldProducts> {
    let mean = match bias {
        Some(bias) => crate::calibrate::bias::subtract_bias(mean, bias)?,
        None => mean.to_owned(),
    };

    let (normalised, _stds_normalised) =
        normalise_rgbg2(&mean.view(), stds, mask, config.smoothing.normalisation_sigma)?;
    info!("Normalised flat-field data");

    let smoothed = gauss_filter(
        &normalised.view().into_dyn(),
        &Sigma::Scalar(config.smoothing.flat_sigma),
    )?
    .into_dimensionality::<Ix2>()?;

    let raw_clipped = clip_data(&normalised.view(), config.clip_border);
    let gauss_clipped = clip_data(&smoothed.view(), config.clip_border);

    let correction = gauss_clipped.mapv(|v| 1.0 / v);
    let correction_raw = raw_clipped.mapv(|v| 1.0 / v);

    info!("Fitting radial vignetting model");
    let fit = fit_vignette_radial(&correction.view(), None)?;
    let correction_modelled = apply_vignette_radial(correction.dim(), &fit.params);

    Ok(FlatFieldProducts {
        correction,
        correction_raw,
        fit,
        correction_modelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_inner_region_only() {
        let data = Array2::<f64>::ones((6, 8));
        let clipped = clip_data(&data.view(), 2);
        assert!(clipped[[1, 4]].is_nan());
        assert!(clipped[[2, 1]].is_nan());
        assert_eq!(clipped[[2, 2]], 1.0);
        assert_eq!(clipped[[3, 5]], 1.0);
        assert!(clipped[[4, 5]].is_nan());
    }

    #[test]
    fn oversized_border_clips_everything() {
        let data = Array2::<f64>::ones((4, 4));
        assert!(clip_data(&data.view(), 2).iter().all(|v| v.is_nan()));
    }
}
