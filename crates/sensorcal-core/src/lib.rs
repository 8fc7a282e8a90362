pub mod analyse;
pub mod calibrate;
pub mod color;
pub mod config;
pub mod consts;
pub mod error;
pub mod filters;
pub mod fit;
pub mod flat;
pub mod io;
pub mod plot;
pub mod stack;

pub use config::CalibrationConfig;
pub use error::{CalibrationError, Result};
