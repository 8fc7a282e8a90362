use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid NPY file: {0}")]
    InvalidNpy(String),

    #[error("Unsupported NPY dtype: {0}")]
    UnsupportedDtype(String),

    #[error("Shape mismatch: {left:?} vs. {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid Bayer colour mask: {0}")]
    InvalidBayerMask(String),

    #[error("Cannot parse {what} from filename '{name}'")]
    FilenameParse { what: &'static str, name: String },

    #[error("Path '{0}' is not inside a calibration folder")]
    NotInCalibrationFolder(PathBuf),

    #[error("No files matching '*{pattern}' in {folder}")]
    NoMatchingFiles { folder: PathBuf, pattern: String },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Fit failed: {0}")]
    FitFailed(String),

    #[error("Covariance matrix is singular")]
    SingularCovariance,

    #[error("RAW decoding error: {0}")]
    RawDecode(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
