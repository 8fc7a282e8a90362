//! Radial vignetting model from the Adobe DNG 1.4 specification:
//!
//! `g(r) = 1 + k0 r² + k1 r⁴ + k2 r⁶ + k3 r⁸ + k4 r¹⁰`
//!
//! `r` is the distance from the optical centre, normalised by the distance
//! from the centre to the farthest image corner. The centre `(cx, cy)` is
//! given as a fraction of the image width and height.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2};

use crate::consts::VIGNETTE_INITIAL_GUESS;
use crate::error::{CalibrationError, Result};
use crate::fit::{curve_fit, CurveModel, FitOptions};

pub const VIGNETTE_PARAMETER_COUNT: usize = 7;

/// Best-fit vignetting parameters `k0..k4, cx, cy` and their standard errors.
#[derive(Clone, Debug, PartialEq)]
pub struct VignetteFit {
    pub params: [f64; VIGNETTE_PARAMETER_COUNT],
    pub standard_errors: [f64; VIGNETTE_PARAMETER_COUNT],
}

impl VignetteFit {
    /// `|100 * error / value|` for each parameter.
    pub fn relative_errors_percent(&self) -> [f64; VIGNETTE_PARAMETER_COUNT] {
        let mut out = [0.0; VIGNETTE_PARAMETER_COUNT];
        for (o, (p, s)) in out
            .iter_mut()
            .zip(self.params.iter().zip(&self.standard_errors))
        {
            *o = (100.0 * s / p).abs();
        }
        out
    }

    /// Stored layout: row 0 parameters, row 1 standard errors.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((2, VIGNETTE_PARAMETER_COUNT), |(row, i)| {
            if row == 0 {
                self.params[i]
            } else {
                self.standard_errors[i]
            }
        })
    }

    pub fn from_array(array: &ArrayView2<f64>) -> Result<Self> {
        if array.dim() != (2, VIGNETTE_PARAMETER_COUNT) {
            return Err(CalibrationError::ShapeMismatch {
                left: array.shape().to_vec(),
                right: vec![2, VIGNETTE_PARAMETER_COUNT],
            });
        }
        let mut params = [0.0; VIGNETTE_PARAMETER_COUNT];
        let mut standard_errors = [0.0; VIGNETTE_PARAMETER_COUNT];
        for i in 0..VIGNETTE_PARAMETER_COUNT {
            params[i] = array[[0, i]];
            standard_errors[i] = array[[1, i]];
        }
        Ok(Self {
            params,
            standard_errors,
        })
    }
}

/// Optical centre and normalisation for one image shape and parameter set.
struct RadialGeometry {
    width: f64,
    height: f64,
    cx: f64,
    cy: f64,
    mx: f64,
    my: f64,
    /// Squared distance from the centre to the farthest corner.
    m2: f64,
}

impl RadialGeometry {
    fn new(shape: (usize, usize), cx_hat: f64, cy_hat: f64) -> Self {
        let (height, width) = (shape.0 as f64, shape.1 as f64);
        let cx = cx_hat * width;
        let cy = cy_hat * height;
        let mx = cx.abs().max((width - cx).abs());
        let my = cy.abs().max((height - cy).abs());
        Self {
            width,
            height,
            cx,
            cy,
            mx,
            my,
            m2: mx * mx + my * my,
        }
    }

    /// Normalised squared radius `r²` of pixel (column `x`, row `y`).
    #[inline]
    fn r2(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.cx;
        let dy = y - self.cy;
        (dx * dx + dy * dy) / self.m2
    }

    /// `d mx / d cx` (and likewise for y): the farther edge moves with the centre.
    fn edge_slope(c: f64, extent: f64) -> f64 {
        if c.abs() >= (extent - c).abs() {
            c.signum()
        } else {
            -(extent - c).signum()
        }
    }

    /// Derivatives of `r²` with respect to `cx_hat` and `cy_hat`.
    fn r2_gradient(&self, x: f64, y: f64) -> (f64, f64) {
        let m = self.m2.sqrt();
        let d2 = (x - self.cx).powi(2) + (y - self.cy).powi(2);
        let ds_dm = -2.0 * d2 / (self.m2 * m);

        let dm_dcx = self.mx / m * Self::edge_slope(self.cx, self.width);
        let dm_dcy = self.my / m * Self::edge_slope(self.cy, self.height);

        let ds_dcx = -2.0 * (x - self.cx) / self.m2 + ds_dm * dm_dcx;
        let ds_dcy = -2.0 * (y - self.cy) / self.m2 + ds_dm * dm_dcy;
        (ds_dcx * self.width, ds_dcy * self.height)
    }
}

/// `1 + k0 s + k1 s² + ... + k4 s⁵` with `s = r²`.
#[inline]
fn polynomial(k: &[f64], s: f64) -> f64 {
    1.0 + s * (k[0] + s * (k[1] + s * (k[2] + s * (k[3] + s * k[4]))))
}

/// `d polynomial / d s`.
#[inline]
fn polynomial_slope(k: &[f64], s: f64) -> f64 {
    k[0] + s * (2.0 * k[1] + s * (3.0 * k[2] + s * (4.0 * k[3] + s * 5.0 * k[4])))
}

/// Correction factor at pixel (column `x`, row `y`) of an image of `shape` (rows, cols).
pub fn vignette_radial(
    shape: (usize, usize),
    x: f64,
    y: f64,
    params: &[f64; VIGNETTE_PARAMETER_COUNT],
) -> f64 {
    let geometry = RadialGeometry::new(shape, params[5], params[6]);
    polynomial(&params[..5], geometry.r2(x, y))
}

/// Evaluate the model over a full image of `shape`.
pub fn apply_vignette_radial(
    shape: (usize, usize),
    params: &[f64; VIGNETTE_PARAMETER_COUNT],
) -> Array2<f64> {
    let geometry = RadialGeometry::new(shape, params[5], params[6]);
    let k = &params[..5];
    Array2::from_shape_fn(shape, |(row, col)| {
        polynomial(k, geometry.r2(col as f64, row as f64))
    })
}

/// Finite samples of a correction map, ready for fitting.
struct RadialVignetteModel {
    shape: (usize, usize),
    xs: Vec<f64>,
    ys: Vec<f64>,
    observed: DVector<f64>,
}

impl RadialVignetteModel {
    fn new(correction: &ArrayView2<f64>) -> Self {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut values = Vec::new();
        for ((row, col), &v) in correction.indexed_iter() {
            if v.is_finite() {
                xs.push(col as f64);
                ys.push(row as f64);
                values.push(v);
            }
        }
        Self {
            shape: correction.dim(),
            xs,
            ys,
            observed: DVector::from_vec(values),
        }
    }
}

impl CurveModel for RadialVignetteModel {
    fn observed(&self) -> &DVector<f64> {
        &self.observed
    }

    fn evaluate(&self, params: &DVector<f64>) -> DVector<f64> {
        let p = params.as_slice();
        let geometry = RadialGeometry::new(self.shape, p[5], p[6]);
        DVector::from_iterator(
            self.xs.len(),
            self.xs
                .iter()
                .zip(&self.ys)
                .map(|(&x, &y)| polynomial(&p[..5], geometry.r2(x, y))),
        )
    }

    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
        let p = params.as_slice();
        let k = &p[..5];
        let geometry = RadialGeometry::new(self.shape, p[5], p[6]);
        let mut jac = DMatrix::zeros(self.xs.len(), VIGNETTE_PARAMETER_COUNT);

        for (i, (&x, &y)) in self.xs.iter().zip(&self.ys).enumerate() {
            let s = geometry.r2(x, y);
            let mut power = s;
            for j in 0..5 {
                jac[(i, j)] = power;
                power *= s;
            }
            let slope = polynomial_slope(k, s);
            let (ds_dcx, ds_dcy) = geometry.r2_gradient(x, y);
            jac[(i, 5)] = slope * ds_dcx;
            jac[(i, 6)] = slope * ds_dcy;
        }
        jac
    }
}

/// Fit the radial model to all finite values of `correction`.
pub fn fit_vignette_radial(
    correction: &ArrayView2<f64>,
    initial: Option<&[f64; VIGNETTE_PARAMETER_COUNT]>,
) -> Result<VignetteFit> {
    let model = RadialVignetteModel::new(correction);
    let initial = initial.unwrap_or(&VIGNETTE_INITIAL_GUESS);
    let fit = curve_fit(&model, initial, &FitOptions::default())?;

    let mut params = [0.0; VIGNETTE_PARAMETER_COUNT];
    let mut standard_errors = [0.0; VIGNETTE_PARAMETER_COUNT];
    params.copy_from_slice(&fit.params);
    standard_errors.copy_from_slice(&fit.standard_errors);
    Ok(VignetteFit {
        params,
        standard_errors,
    })
}
