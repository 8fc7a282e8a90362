//! Raster figures: colour-mapped maps, panel layouts and histograms, saved as PNG.

pub mod canvas;
pub mod colormap;
pub mod figures;
pub mod histogram;

pub use canvas::{grid_2x2, hstack, render_map, vstack, with_colorbar, Canvas};
pub use colormap::{ColorScale, Colormap};
pub use figures::{
    gauss_maps_figure, histogram_figure, map_figure, rgb_histogram_figure, rgb_histograms,
    rgbg_panels, save_figure,
};
pub use histogram::{render_histogram, Histogram};
