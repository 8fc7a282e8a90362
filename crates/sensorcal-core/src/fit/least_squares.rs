use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use tracing::debug;

use crate::error::{CalibrationError, Result};

/// A parametric model evaluated at a fixed set of samples.
pub trait CurveModel {
    /// Observed values, one per sample.
    fn observed(&self) -> &DVector<f64>;

    /// Model values at every sample for `params`.
    fn evaluate(&self, params: &DVector<f64>) -> DVector<f64>;

    /// Derivative of each model value (rows) with respect to each parameter (columns).
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

/// Solver tolerances.
#[derive(Clone, Debug)]
pub struct FitOptions {
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    /// Evaluation budget, in units of (parameter count + 1).
    pub patience: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 0.0,
            patience: 200,
        }
    }
}

/// Best-fit parameters and their uncertainties.
#[derive(Clone, Debug)]
pub struct CurveFit {
    pub params: Vec<f64>,
    pub standard_errors: Vec<f64>,
    pub covariance: DMatrix<f64>,
    /// Sum of squared residuals at the optimum.
    pub ssr: f64,
    pub evaluations: usize,
}

impl CurveFit {
    /// `|100 * error / value|` for each parameter.
    pub fn relative_errors_percent(&self) -> Vec<f64> {
        self.params
            .iter()
            .zip(&self.standard_errors)
            .map(|(p, s)| (100.0 * s / p).abs())
            .collect()
    }
}

struct LmWrapper<'a, M: CurveModel> {
    model: &'a M,
    params: DVector<f64>,
}

impl<M: CurveModel> LeastSquaresProblem<f64, Dyn, Dyn> for LmWrapper<'_, M> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        Some(self.model.evaluate(&self.params) - self.model.observed())
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        Some(self.model.jacobian(&self.params))
    }
}

/// Fit `model` starting from `initial`.
///
/// The covariance is `(JᵀJ)⁻¹ · SSR / (n - p)` with `J` the Jacobian at the
/// optimum, computed through its SVD. A rank-deficient Jacobian is an error.
pub fn curve_fit<M: CurveModel>(model: &M, initial: &[f64], opts: &FitOptions) -> Result<CurveFit> {
    let n = model.observed().len();
    let p = initial.len();
    if n <= p {
        return Err(CalibrationError::FitFailed(format!(
            "{n} samples are not enough to fit {p} parameters"
        )));
    }

    let lm = LevenbergMarquardt::new()
        .with_ftol(opts.ftol)
        .with_xtol(opts.xtol)
        .with_gtol(opts.gtol)
        .with_patience(opts.patience.max(1));

    let wrapper = LmWrapper {
        model,
        params: DVector::from_column_slice(initial),
    };
    let (wrapper, report) = lm.minimize(wrapper);
    debug!(
        "Least squares finished after {} evaluations: {:?}",
        report.number_of_evaluations, report.termination
    );

    if !report.termination.was_successful() {
        return Err(CalibrationError::FitFailed(format!(
            "{:?}",
            report.termination
        )));
    }

    let params = wrapper.params;
    if params.iter().any(|v| !v.is_finite()) {
        return Err(CalibrationError::FitFailed("non-finite parameters".into()));
    }

    let residuals = model.evaluate(&params) - model.observed();
    let ssr = residuals.norm_squared();
    let covariance = covariance(model.jacobian(&params), ssr / (n - p) as f64)?;
    let standard_errors = covariance.diagonal().iter().map(|v| v.sqrt()).collect();

    Ok(CurveFit {
        params: params.iter().copied().collect(),
        standard_errors,
        covariance,
        ssr,
        evaluations: report.number_of_evaluations,
    })
}

fn covariance(jacobian: DMatrix<f64>, residual_variance: f64) -> Result<DMatrix<f64>> {
    let (n, p) = jacobian.shape();
    let svd = jacobian.svd(false, true);
    let v_t = svd.v_t.ok_or(CalibrationError::SingularCovariance)?;
    let s = svd.singular_values;

    let s_max = s.iter().copied().fold(0.0, f64::max);
    let threshold = f64::EPSILON * n.max(p) as f64 * s_max;
    if s_max == 0.0 || s.iter().any(|&v| v <= threshold) {
        return Err(CalibrationError::SingularCovariance);
    }

    // (JᵀJ)⁻¹ = V Σ⁻² Vᵀ
    let inv_s2 = DMatrix::from_diagonal(&s.map(|v| 1.0 / (v * v)));
    Ok(v_t.transpose() * inv_s2 * v_t * residual_variance)
}
