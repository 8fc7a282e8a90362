//! Nonlinear least squares with parameter uncertainties.
//!
//! A [`CurveModel`] supplies model values and their Jacobian for a fixed set
//! of samples; [`curve_fit`] minimises the squared residuals with
//! Levenberg-Marquardt and estimates the parameter covariance from the
//! Jacobian at the optimum.

mod least_squares;

pub use least_squares::{curve_fit, CurveFit, CurveModel, FitOptions};
