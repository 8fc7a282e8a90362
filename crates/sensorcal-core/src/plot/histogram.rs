use crate::error::{CalibrationError, Result};
use crate::plot::canvas::{Canvas, BACKGROUND};

/// Counts of values in equal-width bins over `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values inside the range; the last bin includes `max`.
    /// An empty range is widened to `min - 0.5 ..= max + 0.5`.
    pub fn new<'a>(values: impl IntoIterator<Item = &'a f64>, range: (f64, f64), bins: usize) -> Result<Self> {
        let (mut min, mut max) = range;
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        if bins == 0 || !min.is_finite() || !max.is_finite() || max < min {
            return Err(CalibrationError::InvalidParameter(format!(
                "histogram needs bins > 0 and max > min, got {bins} bins over {min}..{max}"
            )));
        }
        let width = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for &v in values {
            if v.is_finite() && v >= min && v <= max {
                let bin = (((v - min) / width) as usize).min(bins - 1);
                counts[bin] += 1;
            }
        }
        Ok(Self { min, max, counts })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_edges(&self) -> Vec<f64> {
        let n = self.counts.len();
        (0..=n)
            .map(|i| self.min + (self.max - self.min) * i as f64 / n as f64)
            .collect()
    }
}

/// Draw a bar histogram `height` pixels tall, one pixel column per bin
/// scaled horizontally by `bin_width`.
pub fn render_histogram(hist: &Histogram, colour: [u8; 3], bin_width: usize, height: usize) -> Canvas {
    let bin_width = bin_width.max(1);
    let mut canvas = Canvas::from_elem((height, hist.counts.len() * bin_width), BACKGROUND);
    let peak = hist.counts.iter().copied().max().unwrap_or(0);
    if peak == 0 || height == 0 {
        return canvas;
    }
    for (i, &count) in hist.counts.iter().enumerate() {
        let bar = (count as f64 / peak as f64 * height as f64).round() as usize;
        for row in height - bar.min(height)..height {
            for col in i * bin_width..(i + 1) * bin_width {
                canvas[[row, col]] = colour;
            }
        }
    }
    canvas
}
