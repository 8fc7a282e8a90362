use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use ndarray::{Array2, Array3};

use crate::error::Result;

/// Extensions treated as JPEG files when stacking.
pub const JPEG_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

pub fn is_jpeg_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| JPEG_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Load an 8-bit image (JPEG, PNG, ...) as a `height × width × 3` array.
pub fn load_rgb_image(path: &Path) -> Result<Array3<u8>> {
    let img = image::open(path)?.to_rgb8();
    let (w, h) = img.dimensions();
    Ok(Array3::from_shape_vec(
        (h as usize, w as usize, 3),
        img.into_raw(),
    )?)
}

/// Save an RGB pixel grid (`height × width` of `[r, g, b]`) as 8-bit PNG.
pub fn save_rgb_png(pixels: &Array2<[u8; 3]>, path: &Path) -> Result<()> {
    let (h, w) = pixels.dim();
    let mut img = RgbImage::new(w as u32, h as u32);
    for ((row, col), rgb) in pixels.indexed_iter() {
        img.put_pixel(col as u32, row as u32, Rgb(*rgb));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
