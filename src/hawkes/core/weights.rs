//! Coefficient-independent weight cache and its allocator.
//!
//! Purpose
//! -------
//! Hold every quantity the loss and gradient need that depends only on the
//! data and the kernel: the recursive convolution values `g`, their interval
//! integrals `G`, and the link-function sufficient statistics `H1`, `H2`,
//! `H3`. The cache is filled once by `recursion::compute_weights` and then
//! only read.
//!
//! Storage
//! -------
//! - `g[[j, k, u]]`, `g_integral[[j, k, u]]`: shape `(D, M + 2, U)`, i.e.
//!   `(M + 2) × (D·U)` values split into one `(M + 2) × U` block per source
//!   dimension `j`, so the source recursions write disjoint blocks. Row `0`
//!   (the virtual start event) stays zero; row `M + 1` is the horizon.
//! - `h1[[i, n]]`, `h2[[i, n]]`: shape `(D, S)`.
//! - `h3[[i, n, u]]`: shape `(D, S, U)`.
//!
//! `g` and `G` are node-independent: the target dimension only selects which
//! interaction weights multiply them, so a single copy serves every target.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use ndarray::{Array2, Array3};

/// KernelWeights — the read-only weight cache.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelWeights {
    /// Delayed decayed convolution just after each event, per source and kernel.
    pub g: Array3<f64>,
    /// Integral of the convolution over `[t_{k-1}, t_k)`, per source and kernel.
    pub g_integral: Array3<f64>,
    /// Event counts of dimension `i` per state.
    pub h1: Array2<f64>,
    /// Negative time spent per state.
    pub h2: Array2<f64>,
    /// Negative cumulative `G(·, i, u)` per state and kernel.
    pub h3: Array3<f64>,
}

impl KernelWeights {
    pub fn n_dims(&self) -> usize {
        self.g.shape()[0]
    }

    pub fn n_kernels(&self) -> usize {
        self.g.shape()[2]
    }

    pub fn n_states(&self) -> usize {
        self.h1.shape()[1]
    }

    /// Number of rows per source block (`M + 2`).
    pub fn n_steps(&self) -> usize {
        self.g.shape()[1]
    }
}

/// Allocate a zero-initialized cache for `M` merged events, `D` dimensions,
/// `U` kernels and `S` states.
///
/// # Errors
/// - [`HawkesError::ZeroDimensions`] when `n_dims == 0` (nothing bound).
pub fn allocate_weights(
    n_events: usize, n_dims: usize, n_kernels: usize, n_states: usize,
) -> HawkesResult<KernelWeights> {
    if n_dims == 0 {
        return Err(HawkesError::ZeroDimensions);
    }
    let steps = n_events + 2;
    Ok(KernelWeights {
        g: Array3::zeros((n_dims, steps, n_kernels)),
        g_integral: Array3::zeros((n_dims, steps, n_kernels)),
        h1: Array2::zeros((n_dims, n_states)),
        h2: Array2::zeros((n_dims, n_states)),
        h3: Array3::zeros((n_dims, n_states, n_kernels)),
    })
}
