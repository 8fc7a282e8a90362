/// Colour maps used for figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Greys,
    Reds,
    Greens,
    Blues,
    /// Blue-white-red, for signed differences.
    Diverging,
}

/// Drawn for NaN pixels.
pub const NAN_COLOUR: [u8; 3] = [128, 128, 128];

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];
const GREYS: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];
const REDS: [[u8; 3]; 3] = [[255, 245, 240], [251, 106, 74], [103, 0, 13]];
const GREENS: [[u8; 3]; 3] = [[247, 252, 245], [116, 196, 118], [0, 68, 27]];
const BLUES: [[u8; 3]; 3] = [[247, 251, 255], [107, 174, 214], [8, 48, 107]];
const DIVERGING: [[u8; 3]; 3] = [[33, 102, 172], [247, 247, 247], [178, 24, 43]];

impl Colormap {
    fn anchors(self) -> &'static [[u8; 3]] {
        match self {
            Self::Viridis => &VIRIDIS,
            Self::Greys => &GREYS,
            Self::Reds => &REDS,
            Self::Greens => &GREENS,
            Self::Blues => &BLUES,
            Self::Diverging => &DIVERGING,
        }
    }

    /// Single-hue map for an RGBG2 channel index.
    pub fn for_channel(channel: usize) -> Self {
        match channel {
            0 => Self::Reds,
            2 => Self::Blues,
            _ => Self::Greens,
        }
    }

    /// Colour at `t` in `[0, 1]` (clamped), interpolated between anchors.
    pub fn colour(self, t: f64) -> [u8; 3] {
        if t.is_nan() {
            return NAN_COLOUR;
        }
        let anchors = self.anchors();
        let pos = t.clamp(0.0, 1.0) * (anchors.len() - 1) as f64;
        let i = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = pos - i as f64;
        let (a, b) = (anchors[i], anchors[i + 1]);
        let mut out = [0u8; 3];
        for (o, (&x, &y)) in out.iter_mut().zip(a.iter().zip(&b)) {
            *o = (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        }
        out
    }
}

/// Linear colour scale between `vmin` and `vmax`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// `[-bound, bound]`.
    pub fn symmetric(bound: f64) -> Self {
        Self::new(-bound, bound)
    }

    /// Range of the finite values, or `[0, 1]` if there are none.
    pub fn from_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo.is_finite() {
            Self::new(lo, hi)
        } else {
            Self::new(0.0, 1.0)
        }
    }

    /// Position of `value` on the scale; NaN stays NaN.
    pub fn normalise(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span > 0.0 {
            (value - self.vmin) / span
        } else {
            0.5
        }
    }
}
