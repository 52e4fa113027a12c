//! optimization — optimizer-facing surface of the Hawkes likelihood.
//!
//! Purpose
//! -------
//! Let an external optimizer (typically an `argmin` solver) drive a bound
//! [`HawkesSumExpLag`](crate::hawkes::HawkesSumExpLag) without knowing its
//! error types, and provide the finite-difference check that keeps the
//! analytic gradient honest.
//!
//! Key behaviors
//! -------------
//! - [`objective::HawkesObjective`] implements `argmin::core::CostFunction`
//!   and `argmin::core::Gradient` over the model's `loss` and `grad`.
//! - [`finite_diff::check_gradient`] compares `grad` with a `finitediff`
//!   gradient of `loss` and reports the worst coordinate.
//! - [`errors::OptError`] wraps model errors, validation failures, and
//!   `argmin` error kinds behind one `OptResult<T>` alias.
//!
//! Conventions
//! -----------
//! - The cost is the model's normalized negative log-likelihood as is; there
//!   is no sign flip between this layer and the model.
//! - No solver runs inside the crate: choosing a solver, its line search and
//!   stopping rules is left to the caller.
//!
//! Testing notes
//! -------------
//! - Unit tests cover error round-trips through `argmin::core::Error`,
//!   adapter forwarding, and the gradient check under both boundary
//!   conventions.

pub mod errors;
pub mod finite_diff;
pub mod objective;
pub mod types;
pub mod validation;

pub use self::errors::{OptError, OptResult};
pub use self::finite_diff::{GradientCheck, check_gradient};
pub use self::objective::HawkesObjective;
pub use self::types::{Cost, Grad, Theta};

pub mod prelude {
    pub use super::{
        Cost, Grad, GradientCheck, HawkesObjective, OptError, OptResult, Theta, check_gradient,
    };
}
