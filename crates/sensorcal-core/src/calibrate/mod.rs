//! Bias subtraction, ISO normalisation and read-noise products.

pub mod bias;
pub mod iso;
pub mod readnoise;

pub use bias::{correct_bias, load_bias_map, subtract_bias};
pub use iso::{load_iso_lookup_table, normalise_iso, IsoLookupTable};
pub use readnoise::{save_readnoise_map, select_lowest_iso};
