//! Model-level evaluation: the per-dimension loss/gradient kernels and the
//! [`HawkesSumExpLag`] facade that dispatches them.
pub mod loglik;
pub mod sumexp_lag;

pub use self::sumexp_lag::HawkesSumExpLag;
