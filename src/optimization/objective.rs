//! Adapter that exposes a bound [`HawkesSumExpLag`] as an `argmin` problem.
//!
//! The model's `loss` already is a cost (normalized negative log-likelihood)
//! and `grad` its gradient, so no sign flip happens here: the adapter only
//! validates finiteness and routes model errors through [`OptError`].
use crate::{
    hawkes::models::HawkesSumExpLag,
    optimization::{
        errors::OptError,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a bound Hawkes model to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `loss(θ)`.
/// - `Gradient::gradient` returns `grad(θ)`.
///
/// Domain errors (non-positive intensity or link) are returned as errors,
/// wrapped in [`OptError::Hawkes`]; `OptError::from(argmin_error)` recovers
/// them after a solver run.
#[derive(Debug, Clone, Copy)]
pub struct HawkesObjective<'a> {
    pub model: &'a HawkesSumExpLag,
}

impl<'a> HawkesObjective<'a> {
    pub fn new(model: &'a HawkesSumExpLag) -> Self {
        Self { model }
    }
}

impl CostFunction for HawkesObjective<'_> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `loss(θ)`.
    ///
    /// # Errors
    /// - `OptError::Hawkes` for any model error.
    /// - `OptError::NonFiniteCost` if the value is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.model.loss(theta.view()).map_err(OptError::from)?;
        validate_value(output)?;
        Ok(output)
    }
}

impl Gradient for HawkesObjective<'_> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `grad(θ)` into a fresh vector.
    ///
    /// # Errors
    /// - `OptError::Hawkes` for any model error.
    /// - Validation errors for wrong dimension or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        let mut grad = Grad::zeros(dim);
        self.model.grad(theta.view(), grad.view_mut()).map_err(OptError::from)?;
        validate_grad(&grad, dim)?;
        Ok(grad)
    }
}
