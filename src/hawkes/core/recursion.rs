//! Recursive kernel evaluator — fills the weight cache in linear time.
//!
//! Purpose
//! -------
//! Compute, for every source dimension `j`, kernel component `u` and merged
//! step `k = 1..=M+1`, the delayed decayed convolution `g(k, j, u)` and its
//! interval integral `G(k, j, u)`, then derive the per-state sufficient
//! statistics `H1`, `H2`, `H3` of every modeled dimension.
//!
//! Key behaviors
//! -------------
//! - Recursion per step, with `Δ = t_k − t_{k−1}` and `c = t_k − lag_u`:
//!   `G(k) = (1 − e^{−βΔ})/β · g(k−1)` and `g(k) = g(k−1) · e^{−βΔ}`; every
//!   not-yet-included event `e` of dimension `j` with `t_e < c` then adds
//!   `β·e^{−β(c − t_e)}` to `g(k)` and `1 − e^{−β(c − t_e)}` to `G(k)`.
//! - A forward-only scan pointer visits each event once per `(j, u)`, so one
//!   pass is `O(M·U)` per source dimension.
//! - Step `M + 1` uses the horizon `T` as its time stamp.
//! - Two passes with a barrier in between: first one task per source
//!   dimension (disjoint `g`/`G` blocks), then one task per modeled dimension
//!   for the sufficient statistics, which read every `G` block.
//!
//! Invariants & assumptions
//! ------------------------
//! - Eligibility is strict (`t_e < t_k − lag_u`): an event whose delayed
//!   onset coincides with `t_k` starts contributing at step `k + 1`.
//! - `g(0, ·, ·) = G(0, ·, ·) = 0`; all produced values are `>= 0` and finite.
//! - Events of the state-driving stream never enter `g` or `G`.
//!
//! Downstream usage
//! ----------------
//! - Called lazily by `HawkesSumExpLag` on the first loss/gradient request
//!   after a bind; the result is cached and reused across coefficient vectors.
use crate::hawkes::{
    core::{
        data::MergedEvents,
        executor::Executor,
        kernel::SumExpKernel,
        options::BoundaryConvention,
        weights::{KernelWeights, allocate_weights},
    },
    errors::HawkesResult,
};
use ndarray::{ArrayView3, ArrayViewMut1, ArrayViewMut2};
use tracing::debug;

/// Build the full weight cache for `events` under `kernel`.
///
/// Parameters
/// ----------
/// - `events`: validated merged timeline.
/// - `kernel`: decays and lags of the `U` components.
/// - `n_states`: link-table size `S`.
/// - `boundary`: whether `H1` carries the terminal `−1` correction.
/// - `executor`: pool used for both passes.
///
/// Errors
/// ------
/// - `HawkesError::ZeroDimensions` if `events` has no modeled dimension.
pub fn compute_weights(
    events: &MergedEvents, kernel: &SumExpKernel, n_states: usize, boundary: BoundaryConvention,
    executor: &Executor,
) -> HawkesResult<KernelWeights> {
    let n_events = events.n_events();
    let mut weights = allocate_weights(n_events, events.n_dims, kernel.n_kernels(), n_states)?;

    let KernelWeights { g, g_integral, h1, h2, h3 } = &mut weights;

    let sources: Vec<(usize, ArrayViewMut2<f64>, ArrayViewMut2<f64>)> = g
        .outer_iter_mut()
        .zip(g_integral.outer_iter_mut())
        .enumerate()
        .map(|(j, (g_j, big_g_j))| (j, g_j, big_g_j))
        .collect();
    executor.try_for_each(sources, |(j, g_j, big_g_j)| {
        source_recursion(j, events, kernel, g_j, big_g_j);
        Ok(())
    })?;

    let g_integral = g_integral.view();
    let targets: Vec<_> = h1
        .outer_iter_mut()
        .zip(h2.outer_iter_mut())
        .zip(h3.outer_iter_mut())
        .enumerate()
        .map(|(i, ((h1_i, h2_i), h3_i))| (i, h1_i, h2_i, h3_i))
        .collect();
    executor.try_for_each(targets, |(i, h1_i, h2_i, h3_i)| {
        sufficient_stats(i, events, g_integral, boundary, h1_i, h2_i, h3_i);
        Ok(())
    })?;

    debug!(
        n_events,
        n_dims = events.n_dims,
        n_kernels = kernel.n_kernels(),
        n_states,
        parallel = executor.is_parallel(),
        "kernel weights computed"
    );
    Ok(weights)
}

// ---- Helper methods ----

/// Fill the `(M + 2) × U` blocks of source dimension `j`.
fn source_recursion(
    j: usize, events: &MergedEvents, kernel: &SumExpKernel, mut g: ArrayViewMut2<f64>,
    mut big_g: ArrayViewMut2<f64>,
) {
    let n_events = events.n_events();
    for u in 0..kernel.n_kernels() {
        let decay = kernel.decay(u);
        let lag = kernel.lag(u);
        let mut scan = 1usize;

        for k in 1..=n_events + 1 {
            let dt = events.interval(k);
            let prev = g[[k - 1, u]];
            let mut g_k = prev * (-decay * dt).exp();
            let mut big_g_k = -(-decay * dt).exp_m1() / decay * prev;

            let cutoff = events.time(k) - lag;
            while scan <= n_events && events.timestamps[scan] < cutoff {
                if events.is_event_of(scan, j) {
                    let delta = cutoff - events.timestamps[scan];
                    g_k += decay * (-decay * delta).exp();
                    big_g_k += -(-decay * delta).exp_m1();
                }
                scan += 1;
            }

            g[[k, u]] = g_k;
            big_g[[k, u]] = big_g_k;
        }
    }
}

/// Per-state statistics of modeled dimension `i`.
///
/// `H1[n]` counts events of `i` whose preceding interval is in state `n`,
/// `H2[n] = −Σ Δ` and `H3[n, u] = −Σ G(k, i, u)` over the steps in state `n`.
fn sufficient_stats(
    i: usize, events: &MergedEvents, g_integral: ArrayView3<f64>, boundary: BoundaryConvention,
    mut h1: ArrayViewMut1<f64>, mut h2: ArrayViewMut1<f64>, mut h3: ArrayViewMut2<f64>,
) {
    let n_events = events.n_events();
    let n_kernels = g_integral.shape()[2];

    if boundary == BoundaryConvention::Reference {
        h1[events.states[n_events]] -= 1.0;
    }

    for k in 1..=n_events + 1 {
        let n = events.state_before(k);
        if k <= n_events && events.is_event_of(k, i) {
            h1[n] += 1.0;
        }
        h2[n] -= events.interval(k);
        for u in 0..n_kernels {
            h3[[n, u]] -= g_integral[[i, k, u]];
        }
    }
}
