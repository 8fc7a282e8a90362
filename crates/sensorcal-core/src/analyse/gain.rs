use ndarray::{Array2, Array3, ArrayView2, Ix2, Ix3};

use crate::color::bayer::{pull_apart, rgb_values};
use crate::config::CalibrationConfig;
use crate::error::Result;
use crate::filters::gaussian::{gauss_nan, Sigma};
use crate::filters::percentile::symmetric_percentiles;

/// Derived views of one gain map (ADU per electron).
#[derive(Clone, Debug)]
pub struct GainAnalysis {
    /// RGBG2 split, shape `(4, H/2, W/2)`.
    pub rgbg: Array3<f64>,
    /// RGBG2 split smoothed within each channel.
    pub rgbg_smoothed: Array3<f64>,
    /// Full-resolution map smoothed with the combined-map sigma.
    pub combined_smoothed: Array2<f64>,
    /// Colour scale of the smoothed RGBG2 maps.
    pub display_range: (f64, f64),
}

impl GainAnalysis {
    pub fn new(gains: &ArrayView2<f64>, mask: &ArrayView2<u8>, config: &CalibrationConfig) -> Result<Self> {
        let sigma = config.smoothing.map_sigma;
        let rgbg = pull_apart(&gains.into_dyn(), mask)?.into_dimensionality::<Ix3>()?;
        let rgbg_smoothed = gauss_nan(&rgbg.view().into_dyn(), &Sigma::from([0.0, sigma, sigma]))?
            .into_dimensionality::<Ix3>()?;
        let combined_smoothed = gauss_nan(
            &gains.into_dyn(),
            &Sigma::Scalar(config.smoothing.combined_map_sigma),
        )?
        .into_dimensionality::<Ix2>()?;
        let display_range = symmetric_percentiles(rgbg_smoothed.iter(), config.display.percentile)?;

        Ok(Self {
            rgbg,
            rgbg_smoothed,
            combined_smoothed,
            display_range,
        })
    }

    /// Finite R, G (G and G2 merged) and B values.
    pub fn rgb_values(&self) -> [Vec<f64>; 3] {
        rgb_values(&self.rgbg.view().into_dyn())
    }

    /// Range of the unsmoothed RGBG2 values, all channels together.
    pub fn value_range(&self, percent: f64) -> Result<(f64, f64)> {
        symmetric_percentiles(self.rgbg.iter(), percent)
    }
}
