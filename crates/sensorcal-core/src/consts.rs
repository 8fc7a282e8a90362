/// Minimum element count to filter Gaussian lanes in parallel.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Gaussian kernels are truncated at this many standard deviations.
pub const GAUSS_TRUNCATE: f64 = 4.0;

/// Number of Bayer colour channels (R, G, B, G2).
pub const BAYER_CHANNEL_COUNT: usize = 4;

/// Channel labels in Bayer-mask value order.
pub const RGBG2_LABELS: [&str; BAYER_CHANNEL_COUNT] = ["R", "G", "B", "G2"];

/// Vignetting parameter labels, in fit order.
pub const VIGNETTE_PARAMETER_LABELS: [&str; 7] = ["k0", "k1", "k2", "k3", "k4", "cx", "cy"];

/// Initial guess for the radial vignetting fit.
pub const VIGNETTE_INITIAL_GUESS: [f64; 7] = [1.0, 2.0, -5.0, 5.0, -2.0, 0.5, 0.5];

/// Default border (pixels) made NaN around flat-field data to drop mechanical vignetting.
pub const DEFAULT_CLIP_BORDER: usize = 250;

/// Raw values at or above this level are treated as saturated.
pub const DEFAULT_SATURATION: f64 = 4000.0;

/// Sigma of the per-channel Gaussian used to find flat-field maxima.
pub const DEFAULT_NORMALISATION_SIGMA: f64 = 5.0;

/// Sigma of the Gaussian that removes small-scale flat-field structure.
pub const DEFAULT_FLAT_SIGMA: f64 = 10.0;

/// Sigma of the per-channel Gaussian used for diagnostic maps.
pub const DEFAULT_MAP_SIGMA: f64 = 5.0;

/// Sigma of the Gaussian used for full-resolution diagnostic maps.
pub const DEFAULT_COMBINED_MAP_SIGMA: f64 = 10.0;

/// Percentile cut (in percent) on each side for display colour scales.
pub const DEFAULT_DISPLAY_PERCENTILE: f64 = 0.1;

/// Default number of histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 250;

/// Sigma (degrees) on the polariser angle used for Malus intensity errors.
pub const DEFAULT_POLARISER_SIGMA_DEG: f64 = 1.0;
