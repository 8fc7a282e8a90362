use ndarray::{s, Array2, ArrayView2};

use crate::plot::colormap::{ColorScale, Colormap, NAN_COLOUR};

/// RGB pixel grid, `(rows, columns)`.
pub type Canvas = Array2<[u8; 3]>;

pub const BACKGROUND: [u8; 3] = [255, 255, 255];

const COLORBAR_WIDTH: usize = 12;
const COLORBAR_GAP: usize = 6;

/// Colour-map `data` onto a canvas of the same shape. NaN pixels are grey.
pub fn render_map(data: &ArrayView2<f64>, scale: ColorScale, cmap: Colormap) -> Canvas {
    data.mapv(|v| {
        if v.is_nan() {
            NAN_COLOUR
        } else {
            cmap.colour(scale.normalise(v))
        }
    })
}

/// Append a vertical colour bar (top = `vmax`) to the right of `map`.
pub fn with_colorbar(map: &Canvas, cmap: Colormap) -> Canvas {
    let (h, w) = map.dim();
    let mut out = Canvas::from_elem((h, w + COLORBAR_GAP + COLORBAR_WIDTH), BACKGROUND);
    out.slice_mut(s![.., ..w]).assign(map);
    let denom = h.saturating_sub(1).max(1) as f64;
    for row in 0..h {
        let colour = cmap.colour(1.0 - row as f64 / denom);
        out.slice_mut(s![row, w + COLORBAR_GAP..]).fill(colour);
    }
    out
}

/// Panels side by side, top-aligned, separated by `gap` background columns.
pub fn hstack(panels: &[Canvas], gap: usize) -> Canvas {
    let h = panels.iter().map(|p| p.nrows()).max().unwrap_or(0);
    let w = panels.iter().map(|p| p.ncols()).sum::<usize>() + gap * panels.len().saturating_sub(1);
    let mut out = Canvas::from_elem((h, w), BACKGROUND);
    let mut col = 0;
    for panel in panels {
        let (ph, pw) = panel.dim();
        out.slice_mut(s![..ph, col..col + pw]).assign(panel);
        col += pw + gap;
    }
    out
}

/// Panels stacked vertically, left-aligned, separated by `gap` background rows.
pub fn vstack(panels: &[Canvas], gap: usize) -> Canvas {
    let w = panels.iter().map(|p| p.ncols()).max().unwrap_or(0);
    let h = panels.iter().map(|p| p.nrows()).sum::<usize>() + gap * panels.len().saturating_sub(1);
    let mut out = Canvas::from_elem((h, w), BACKGROUND);
    let mut row = 0;
    for panel in panels {
        let (ph, pw) = panel.dim();
        out.slice_mut(s![row..row + ph, ..pw]).assign(panel);
        row += ph + gap;
    }
    out
}

/// Four panels in a 2x2 grid: `[0] [1]` over `[2] [3]`.
pub fn grid_2x2(panels: &[Canvas; 4], gap: usize) -> Canvas {
    let top = hstack(&panels[..2], gap);
    let bottom = hstack(&panels[2..], gap);
    vstack(&[top, bottom], gap)
}
