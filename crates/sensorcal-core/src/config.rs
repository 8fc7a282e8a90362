use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_CLIP_BORDER, DEFAULT_COMBINED_MAP_SIGMA, DEFAULT_DISPLAY_PERCENTILE, DEFAULT_FLAT_SIGMA,
    DEFAULT_HISTOGRAM_BINS, DEFAULT_MAP_SIGMA, DEFAULT_NORMALISATION_SIGMA,
    DEFAULT_POLARISER_SIGMA_DEG, DEFAULT_SATURATION,
};
use crate::error::Result;

/// Name of the optional config file in a calibration root.
pub const CONFIG_FILE_NAME: &str = "sensorcal.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Camera name used in figure titles and summaries.
    pub camera: String,
    /// Pixels made NaN around flat-field maps before fitting.
    pub clip_border: usize,
    /// Raw values at or above this are treated as saturated.
    pub saturation: f64,
    pub smoothing: SmoothingConfig,
    pub display: DisplayConfig,
    pub linearity: LinearityConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            camera: "camera".into(),
            clip_border: DEFAULT_CLIP_BORDER,
            saturation: DEFAULT_SATURATION,
            smoothing: SmoothingConfig::default(),
            display: DisplayConfig::default(),
            linearity: LinearityConfig::default(),
        }
    }
}

impl CalibrationConfig {
    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Use `root/sensorcal.toml` if present, otherwise the defaults.
    pub fn for_root(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            debug!("Loading config from {}", path.display());
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Gaussian sigmas (pixels) used by the different tools.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Within-channel sigma when finding flat-field maxima.
    pub normalisation_sigma: f64,
    /// Sigma of the smoothed flat-field map.
    pub flat_sigma: f64,
    /// Within-channel sigma of diagnostic RGBG maps.
    pub map_sigma: f64,
    /// Sigma of full-resolution diagnostic maps.
    pub combined_map_sigma: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            normalisation_sigma: DEFAULT_NORMALISATION_SIGMA,
            flat_sigma: DEFAULT_FLAT_SIGMA,
            map_sigma: DEFAULT_MAP_SIGMA,
            combined_map_sigma: DEFAULT_COMBINED_MAP_SIGMA,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Percent cut on each side for colour scales.
    pub percentile: f64,
    pub histogram_bins: usize,
    /// Histogram range for gain maps (ADU/e-).
    pub gain_range: (f64, f64),
    /// Shared histogram range when several gain maps are compared.
    pub gain_comparison_range: (f64, f64),
    /// Histogram range for normalised read noise (ADU).
    pub readnoise_range: (f64, f64),
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_DISPLAY_PERCENTILE,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            gain_range: (0.0, 3.5),
            gain_comparison_range: (0.4, 2.8),
            readnoise_range: (0.0, 15.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearityConfig {
    /// Uncertainty of the polariser angle in degrees.
    pub polariser_sigma: f64,
    /// Lower edge of the R² histogram.
    pub r2_min: f64,
}

impl Default for LinearityConfig {
    fn default() -> Self {
        Self {
            polariser_sigma: DEFAULT_POLARISER_SIGMA_DEG,
            r2_min: 0.995,
        }
    }
}
