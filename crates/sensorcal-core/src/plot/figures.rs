use std::path::Path;

use ndarray::{ArrayView2, ArrayView3, Axis, Ix3};
use tracing::debug;

use crate::color::bayer::{pull_apart, rgb_values};
use crate::error::Result;
use crate::filters::gaussian::{gauss_nan, Sigma};
use crate::filters::percentile::symmetric_percentiles;
use crate::io::image_io::save_rgb_png;
use crate::plot::canvas::{grid_2x2, render_map, vstack, with_colorbar, Canvas};
use crate::plot::colormap::{ColorScale, Colormap};
use crate::plot::histogram::{render_histogram, Histogram};

const PANEL_GAP: usize = 8;
const HISTOGRAM_HEIGHT: usize = 120;
const HISTOGRAM_BIN_WIDTH: usize = 2;

/// Bar colours for R, G, B histograms.
pub const RGB_COLOURS: [[u8; 3]; 3] = [[214, 39, 40], [44, 160, 44], [31, 119, 180]];

/// One map with a colour bar.
pub fn map_figure(data: &ArrayView2<f64>, scale: ColorScale, cmap: Colormap) -> Canvas {
    with_colorbar(&render_map(data, scale, cmap), cmap)
}

/// RGBG2 channels (`(4, h, w)`) in a 2x2 grid, each in its own hue.
/// Without a shared `scale`, each channel uses its own finite range.
pub fn rgbg_panels(rgbg: &ArrayView3<f64>, scale: Option<ColorScale>) -> Canvas {
    let panels: Vec<Canvas> = rgbg
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(c, channel)| {
            let scale = scale.unwrap_or_else(|| ColorScale::from_finite(channel.iter()));
            map_figure(&channel, scale, Colormap::for_channel(c))
        })
        .collect();
    let [r, g, b, g2]: [Canvas; 4] = match panels.try_into() {
        Ok(p) => p,
        Err(_) => return Canvas::default((0, 0)),
    };
    // Keep the Bayer-cell layout: R G on top, G2 B below.
    grid_2x2(&[r, g, g2, b], PANEL_GAP)
}

/// R, G and B histograms over a shared range, stacked vertically.
pub fn rgb_histograms(values: &[Vec<f64>; 3], range: (f64, f64), bins: usize) -> Result<Canvas> {
    let mut panels = Vec::with_capacity(3);
    for (channel, colour) in values.iter().zip(RGB_COLOURS) {
        let hist = Histogram::new(channel, range, bins)?;
        panels.push(render_histogram(&hist, colour, HISTOGRAM_BIN_WIDTH, HISTOGRAM_HEIGHT));
    }
    Ok(vstack(&panels, PANEL_GAP))
}

/// Histogram of all finite values in a single colour.
pub fn histogram_figure<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    range: (f64, f64),
    bins: usize,
) -> Result<Canvas> {
    let hist = Histogram::new(values, range, bins)?;
    Ok(render_histogram(&hist, [0, 0, 0], HISTOGRAM_BIN_WIDTH, HISTOGRAM_HEIGHT))
}

/// RGB histogram of a full-resolution map split by its Bayer mask.
pub fn rgb_histogram_figure(
    data: &ArrayView2<f64>,
    mask: &ArrayView2<u8>,
    range: (f64, f64),
    bins: usize,
) -> Result<Canvas> {
    let rgbg = pull_apart(&data.into_dyn(), mask)?;
    rgb_histograms(&rgb_values(&rgbg.view()), range, bins)
}

/// RGBG2 maps smoothed within each channel by `sigma`, on a shared colour
/// scale cut at `percent` on each side.
pub fn gauss_maps_figure(
    data: &ArrayView2<f64>,
    mask: &ArrayView2<u8>,
    sigma: f64,
    percent: f64,
) -> Result<Canvas> {
    let rgbg = pull_apart(&data.into_dyn(), mask)?;
    let smoothed = gauss_nan(&rgbg.view(), &Sigma::from([0.0, sigma, sigma]))?
        .into_dimensionality::<Ix3>()?;
    let (vmin, vmax) = symmetric_percentiles(smoothed.iter(), percent)?;
    Ok(rgbg_panels(&smoothed.view(), Some(ColorScale::new(vmin, vmax))))
}

pub fn save_figure(canvas: &Canvas, path: &Path) -> Result<()> {
    save_rgb_png(canvas, path)?;
    debug!("Saved figure {}", path.display());
    Ok(())
}
