//! Hawkes options — evaluation-time configuration.
//!
//! Purpose
//! -------
//! Collect the knobs that control *how* loss and gradient are evaluated,
//! independently of the data and of the kernel: the worker-pool size used by
//! every parallel pass and the boundary convention applied to the terminal
//! interval `[t_M, T)`.
//!
//! Key behaviors
//! -------------
//! - [`HawkesOptions::new`] validates the thread count (`>= 1`).
//! - [`BoundaryConvention`] selects between the exact derivative of the loss
//!   and the reference convention that also feeds the terminal step into the
//!   `1/den` sums and subtracts one terminal count from `H1`.
//!
//! Conventions
//! -----------
//! - `n_threads == 1` is the sequential fallback: no pool is built and every
//!   per-dimension task runs on the calling thread.
//! - The defaults (`n_threads = 1`, `BoundaryConvention::Exact`) make `grad`
//!   agree with finite differences of `loss`.
use crate::hawkes::errors::{HawkesError, HawkesResult};

/// Treatment of the terminal interval in the gradient sums.
///
/// - `Exact`: `1/den` and `g/den` run over events only and `H1` holds plain
///   event counts; `grad` is the exact derivative of `loss`.
/// - `Reference`: the terminal step `k = M + 1` is also accumulated into the
///   `1/den` and `g/den` sums, and `H1` is decremented once at the state of
///   the final event. This reproduces the normalization convention of fits
///   produced by earlier estimation pipelines; `grad` then differs from the
///   derivative of `loss` by those boundary terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryConvention {
    #[default]
    Exact,
    Reference,
}

/// HawkesOptions — worker-pool size and boundary convention.
///
/// Fields
/// ------
/// - `n_threads`: `usize`
///   Worker-pool size for the kernel recursion, loss, and gradient passes.
/// - `boundary`: [`BoundaryConvention`]
///   Terminal-interval convention for the gradient and `H1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HawkesOptions {
    pub n_threads: usize,
    pub boundary: BoundaryConvention,
}

impl HawkesOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
    pub fn new(n_threads: usize, boundary: BoundaryConvention) -> HawkesResult<Self> {
        if n_threads == 0 {
            return Err(HawkesError::InvalidThreadCount { n_threads });
        }
        Ok(HawkesOptions { n_threads, boundary })
    }

    /// Options with the given pool size and the exact boundary convention.
    pub fn with_threads(n_threads: usize) -> HawkesResult<Self> {
        HawkesOptions::new(n_threads, BoundaryConvention::Exact)
    }
}

impl Default for HawkesOptions {
    fn default() -> Self {
        HawkesOptions { n_threads: 1, boundary: BoundaryConvention::Exact }
    }
}
