//! Analysis of calibration data: summary statistics, gain maps, linearity
//! and spectral response.

pub mod gain;
pub mod linearity;
pub mod spectral;
pub mod statistics;

pub use statistics::{rms, Statistics, StatisticsTable};
