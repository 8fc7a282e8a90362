//! Flat-field correction maps and the radial vignetting model.

pub mod flatfield;
pub mod vignette;

pub use flatfield::{
    build_flat_field, clip_data, correct_flatfield_from_map, difference_map,
    load_flat_field_correction_map, normalise_rgbg2, read_flat_field_correction, FlatFieldProducts,
    MapComparison,
};
pub use vignette::{apply_vignette_radial, fit_vignette_radial, vignette_radial, VignetteFit};
