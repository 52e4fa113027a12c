//! Shared numeric aliases for the optimizer-facing layer.
//!
//! `argmin` solvers are generic over their parameter, gradient and cost
//! types; these aliases pin them to the `ndarray` shapes the Hawkes model
//! evaluates, so a solver built as `LBFGS<_, Theta, Grad, Cost>` accepts a
//! [`HawkesObjective`](crate::optimization::objective::HawkesObjective)
//! directly.
use ndarray::Array1;

/// Flat coefficient vector `θ` (see `hawkes::ParamLayout`).
pub type Theta = Array1<f64>;

/// Gradient of the cost, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Normalized negative log-likelihood.
pub type Cost = f64;
