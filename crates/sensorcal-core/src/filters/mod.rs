pub mod gaussian;
pub mod percentile;

pub use gaussian::{gauss_filter, gauss_nan, Sigma};
pub use percentile::{nan_percentile, symmetric_bound, symmetric_percentiles};
