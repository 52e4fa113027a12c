//! finite_diff — numerical verification of the analytic gradient.
//!
//! Purpose
//! -------
//! Compare `HawkesSumExpLag::grad` against a finite-difference gradient of
//! `HawkesSumExpLag::loss` at a given coefficient vector, and report the
//! worst coordinate. This is the consistency check to run after changing
//! kernels, boundary conventions, or data layouts.
//!
//! Key behaviors
//! -------------
//! - Central differences via `finitediff` first; if any perturbed evaluation
//!   fails (e.g. a coordinate sits on the edge of the admissible region) the
//!   forward scheme is used instead.
//! - Errors raised inside the finite-difference closure are captured in a
//!   `RefCell` (the closure must return `f64`) and surfaced afterwards.
//! - The per-coordinate error is scaled as `|a − n| / (1 + |n|)`.
//!
//! Conventions
//! -----------
//! - Under `BoundaryConvention::Reference` the analytic gradient carries
//!   terminal terms that the loss does not; a failed check is then expected.
use crate::{
    hawkes::models::HawkesSumExpLag,
    optimization::{
        errors::{OptError, OptResult},
        objective::HawkesObjective,
        types::{Grad, Theta},
        validation::{validate_grad, verify_tolerance},
    },
};
use argmin::core::CostFunction;
use argmin_math::ArgminL2Norm;
use finitediff::FiniteDiff;
use std::cell::RefCell;
use tracing::debug;

/// Outcome of [`check_gradient`].
///
/// - `analytic`, `numeric`: the two gradients.
/// - `worst_index`, `max_scaled_err`: largest scaled discrepancy and where.
/// - `err_norm`: L2 norm of `analytic − numeric`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: Grad,
    pub numeric: Grad,
    pub worst_index: usize,
    pub max_scaled_err: f64,
    pub err_norm: f64,
    pub tol: f64,
}

impl GradientCheck {
    pub fn passed(&self) -> bool {
        self.max_scaled_err <= self.tol
    }
}

/// check_gradient — analytic vs finite-difference gradient at `coeffs`.
///
/// Parameters
/// ----------
/// - `model`: bound Hawkes model.
/// - `coeffs`: admissible coefficient vector (`n_coeffs` entries).
/// - `tol`: acceptance threshold on the scaled per-coordinate error.
///
/// Errors
/// ------
/// - `OptError::InvalidTolerance` for a non-positive or non-finite `tol`.
/// - `OptError::Hawkes` if the model fails at `coeffs` itself, or at the
///   perturbed points of both difference schemes.
/// - Gradient validation errors for non-finite numeric gradients.
pub fn check_gradient(
    model: &HawkesSumExpLag, coeffs: &Theta, tol: f64,
) -> OptResult<GradientCheck> {
    verify_tolerance(tol)?;
    let (_, analytic) = model.loss_and_grad(coeffs.view())?;

    let objective = HawkesObjective::new(model);
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let cost_func = |theta: &Theta| -> f64 {
        match objective.cost(theta) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(OptError::from(e));
                }
                f64::NAN
            }
        }
    };

    let mut numeric = coeffs.central_diff(&cost_func);
    if closure_err.borrow().is_some() {
        numeric = run_fd_diff(coeffs, &cost_func, &closure_err)?;
    }
    validate_grad(&numeric, coeffs.len())?;

    let diff = &analytic - &numeric;
    let (worst_index, max_scaled_err) = diff
        .iter()
        .zip(numeric.iter())
        .map(|(d, n)| d.abs() / (1.0 + n.abs()))
        .enumerate()
        .fold((0, 0.0_f64), |best, (i, e)| if e > best.1 { (i, e) } else { best });
    let err_norm = diff.l2_norm();

    debug!(worst_index, max_scaled_err, err_norm, tol, "gradient check");
    Ok(GradientCheck { analytic, numeric, worst_index, max_scaled_err, err_norm, tol })
}

/// Forward-difference gradient with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, and returns the first error the
/// closure captured, if any.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<OptError>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hawkes::{BoundaryConvention, HawkesError, HawkesOptions, SumExpKernel};
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A passing check under the exact convention.
    // - A failing check under the reference convention.
    // - Tolerance validation and errors at the base point.
    // -------------------------------------------------------------------------

    fn bound_model(boundary: BoundaryConvention) -> HawkesSumExpLag {
        let kernel = SumExpKernel::new(array![1.3, 0.6], array![0.0, 0.25]).unwrap();
        let options = HawkesOptions::new(1, boundary).unwrap();
        let mut model = HawkesSumExpLag::new(kernel, 2, options).unwrap();
        let modeled = vec![array![0.2, 0.9, 1.7, 2.2, 3.4], array![0.6, 1.1, 2.9]];
        let states = [0, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0];
        model.bind(&modeled, &array![1.4, 2.5], &states, 4.0).unwrap();
        model
    }

    fn admissible(n: usize) -> Array1<f64> {
        Array1::from_iter((0..n).map(|k| 0.15 + 0.02 * (k % 7) as f64))
    }

    #[test]
    // Purpose
    // -------
    // The exact convention passes a tight finite-difference check.
    fn exact_gradient_passes() {
        let model = bound_model(BoundaryConvention::Exact);
        let coeffs = admissible(model.n_coeffs());
        let report = check_gradient(&model, &coeffs, 1e-5).unwrap();
        assert!(report.passed(), "{report:?}");
        assert!(report.err_norm < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // The reference convention's terminal terms are visible to the check.
    fn reference_gradient_differs_from_loss_derivative() {
        let model = bound_model(BoundaryConvention::Reference);
        let coeffs = admissible(model.n_coeffs());
        let report = check_gradient(&model, &coeffs, 1e-5).unwrap();
        assert!(!report.passed());
    }

    #[test]
    // Purpose
    // -------
    // Bad tolerances and inadmissible base points are errors, not reports.
    fn invalid_inputs_are_errors() {
        let model = bound_model(BoundaryConvention::Exact);
        let coeffs = admissible(model.n_coeffs());
        assert!(matches!(
            check_gradient(&model, &coeffs, -1.0),
            Err(OptError::InvalidTolerance { .. })
        ));

        let mut bad = coeffs.clone();
        bad[0] = -10.0;
        let err = check_gradient(&model, &bad, 1e-5).unwrap_err();
        assert!(matches!(err.as_hawkes(), Some(HawkesError::NonPositiveIntensity { .. })));
    }
}
