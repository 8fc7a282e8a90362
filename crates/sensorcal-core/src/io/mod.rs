pub mod filename;
pub mod image_io;
pub mod layout;
pub mod loaders;
pub mod npy;
pub mod raw;

pub use layout::{find_root_folder, CalibrationFolders};
pub use loaders::{load_colour, load_means, load_npy, load_stds};
pub use npy::{read_npy, read_npy_u8, write_npy};
