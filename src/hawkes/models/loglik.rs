//! Per-dimension loss and gradient kernels.
//!
//! Purpose
//! -------
//! Evaluate, for one modeled dimension `i`, its contribution to the
//! normalized negative log-likelihood and to the gradient, reading only the
//! cached [`KernelWeights`] and a typed coefficient view. Each function is a
//! self-contained task: the model facade runs one per dimension and reduces.
//!
//! Key behaviors
//! -------------
//! - With `den_k = mu_i + Σ_j Σ_u alpha_{u,i,j} · g(k, j, u)` and
//!   `n_k` the state before event `k`, dimension `i` contributes
//!   `−T − (A + B + C + D)` where
//!   - `A = Σ_{k ∈ i} log f_i[n_k]`,
//!   - `B = Σ_{k ∈ i} log den_k`,
//!   - `C = −mu_i · Σ_{k=1}^{M+1} Δ_k · f_i[n_k]`,
//!   - `D = −Σ_j Σ_u alpha_{u,i,j} · Σ_{k=1}^{M+1} G(k, j, u) · f_i[n_k]`.
//! - The gradient slot of dimension `i` receives the unnormalized,
//!   un-negated partials; the caller scales the whole vector by
//!   `−1 / total_events`.
//! - The per-task accumulator `Σ_k G · f` lives on the task's stack, so
//!   concurrent dimensions never share mutable state.
//!
//! Invariants & assumptions
//! ------------------------
//! - `den_k > 0` at every event of `i`, otherwise
//!   `HawkesError::NonPositiveIntensity`.
//! - `f_i[n_k] > 0` at every event of `i`, otherwise
//!   `HawkesError::NonPositiveLink`.
//! - The `−T` term is charged once per dimension.
use crate::hawkes::{
    core::{
        data::MergedEvents, options::BoundaryConvention, params::HawkesParams,
        weights::KernelWeights,
    },
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array2, ArrayView1};

/// Disjoint gradient output of one dimension.
///
/// - `baseline`: `∂/∂mu_i`.
/// - `interaction`: `∂/∂alpha_{u,i,j}` at `u·D + j`.
/// - `link`: `∂/∂f_i[n]` for `n in 0..S`.
#[derive(Debug)]
pub struct GradSlot<'a> {
    pub dim: usize,
    pub baseline: &'a mut f64,
    pub interaction: &'a mut [f64],
    pub link: &'a mut [f64],
}

/// Loss contribution `−T − (A + B + C + D)` of dimension `i`.
///
/// Errors
/// ------
/// - `HawkesError::NonPositiveLink` / `HawkesError::NonPositiveIntensity` at
///   the first event of `i` where `f_i[n_k]` or `den_k` is not `> 0`.
pub fn loss_dim(
    i: usize, events: &MergedEvents, weights: &KernelWeights, params: &HawkesParams<'_>,
) -> HawkesResult<f64> {
    let n_events = events.n_events();
    let mu = params.baseline(i);
    let alpha = params.interaction_block(i);
    let link = params.link_table(i);

    let mut loglik = 0.0;
    for k in 1..=n_events {
        if !events.is_event_of(k, i) {
            continue;
        }
        let f_k = checked_link(i, &link, events.state_before(k))?;
        let den = checked_intensity(i, k, mu, &alpha, weights)?;
        loglik += f_k.ln() + den.ln();
    }

    let mut exposure = 0.0;
    for k in 1..=n_events + 1 {
        exposure += events.interval(k) * link[events.state_before(k)];
    }
    loglik -= mu * exposure;

    let sum_g = integrated_excitation(events, weights, &link);
    let n_dims = weights.n_dims();
    for ((j, u), &s) in sum_g.indexed_iter() {
        loglik -= alpha[u * n_dims + j] * s;
    }

    Ok(-events.horizon - loglik)
}

/// Fill `slot` with the raw partials of dimension `slot.dim`.
///
/// Under [`BoundaryConvention::Reference`] the terminal step `k = M + 1` is
/// also fed into the `1/den` and `g/den` sums.
///
/// Errors
/// ------
/// - Same domain errors as [`loss_dim`]; additionally the terminal
///   intensity must be `> 0` under the reference convention, and a link
///   value with a non-zero `H1` count must be `> 0`.
pub fn grad_dim(
    slot: GradSlot<'_>, events: &MergedEvents, weights: &KernelWeights,
    params: &HawkesParams<'_>, boundary: BoundaryConvention,
) -> HawkesResult<()> {
    let GradSlot { dim: i, baseline, interaction, link: link_out } = slot;
    let n_events = events.n_events();
    let n_dims = weights.n_dims();
    let n_kernels = weights.n_kernels();
    let mu = params.baseline(i);
    let alpha = params.interaction_block(i);
    let link = params.link_table(i);

    let last = match boundary {
        BoundaryConvention::Exact => n_events,
        BoundaryConvention::Reference => n_events + 1,
    };

    let mut grad_mu = 0.0;
    for k in 1..=last {
        let terminal = k == n_events + 1;
        if !terminal && !events.is_event_of(k, i) {
            continue;
        }
        if !terminal {
            checked_link(i, &link, events.state_before(k))?;
        }
        let inv_den = checked_intensity(i, k, mu, &alpha, weights)?.recip();
        grad_mu += inv_den;
        for j in 0..n_dims {
            for u in 0..n_kernels {
                interaction[u * n_dims + j] += weights.g[[j, k, u]] * inv_den;
            }
        }
    }

    for k in 1..=n_events + 1 {
        grad_mu -= events.interval(k) * link[events.state_before(k)];
    }
    *baseline = grad_mu;

    let sum_g = integrated_excitation(events, weights, &link);
    for ((j, u), &s) in sum_g.indexed_iter() {
        interaction[u * n_dims + j] -= s;
    }

    for (n, out) in link_out.iter_mut().enumerate() {
        let count = weights.h1[[i, n]];
        let count_term = if count == 0.0 {
            0.0
        } else {
            checked_link(i, &link, n)?;
            count / link[n]
        };
        let mut excitation = 0.0;
        for j in 0..n_dims {
            for u in 0..n_kernels {
                excitation += alpha[u * n_dims + j] * weights.h3[[j, n, u]];
            }
        }
        *out = count_term + mu * weights.h2[[i, n]] + excitation;
    }
    Ok(())
}

// ---- Helper methods ----

/// `den_k` for dimension `i`, rejected unless strictly positive.
#[inline]
fn checked_intensity(
    i: usize, k: usize, mu: f64, alpha: &ArrayView1<'_, f64>, weights: &KernelWeights,
) -> HawkesResult<f64> {
    let n_dims = weights.n_dims();
    let mut den = mu;
    for j in 0..n_dims {
        for u in 0..weights.n_kernels() {
            den += alpha[u * n_dims + j] * weights.g[[j, k, u]];
        }
    }
    if den > 0.0 {
        Ok(den)
    } else {
        Err(HawkesError::NonPositiveIntensity { dim: i, event: k, value: den })
    }
}

#[inline]
fn checked_link(i: usize, link: &ArrayView1<'_, f64>, n: usize) -> HawkesResult<f64> {
    let value = link[n];
    if value > 0.0 {
        Ok(value)
    } else {
        Err(HawkesError::NonPositiveLink { dim: i, state: n, value })
    }
}

/// `Σ_{k=1}^{M+1} G(k, j, u) · f_i[n_k]` for every `(j, u)`.
fn integrated_excitation(
    events: &MergedEvents, weights: &KernelWeights, link: &ArrayView1<'_, f64>,
) -> Array2<f64> {
    let n_events = events.n_events();
    let mut sum_g = Array2::<f64>::zeros((weights.n_dims(), weights.n_kernels()));
    for (j, mut row) in sum_g.outer_iter_mut().enumerate() {
        for k in 1..=n_events + 1 {
            let f_k = link[events.state_before(k)];
            for (u, acc) in row.iter_mut().enumerate() {
                *acc += weights.g_integral[[j, k, u]] * f_k;
            }
        }
    }
    sum_g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hawkes::core::{
        executor::Executor, kernel::SumExpKernel, params::ParamLayout,
        recursion::compute_weights,
    };
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `loss_dim` on a one-dimensional, single-state toy with closed form.
    // - Domain errors for non-positive intensity and link values.
    // - `grad_dim` against central differences of `loss_dim` (exact convention).
    // - The extra terminal terms of the reference convention.
    // -------------------------------------------------------------------------

    fn single_stream(ts: Array1<f64>, horizon: f64) -> (MergedEvents, KernelWeights) {
        let n = ts.len();
        let events = MergedEvents::new(&[ts], &array![], &vec![0; n + 1], horizon, 1).unwrap();
        let kernel = SumExpKernel::without_lags(array![1.0]).unwrap();
        let weights = compute_weights(
            &events,
            &kernel,
            1,
            BoundaryConvention::Exact,
            &Executor::new(1).unwrap(),
        )
        .unwrap();
        (events, weights)
    }

    #[test]
    // Purpose
    // -------
    // Closed-form check with one event and no excitation before it.
    //
    // Given
    // -----
    // - One event at t = 1, T = 2, decay 1, S = 1.
    // - mu = 0.5, alpha = 0.3, f = 2.
    //
    // Expect
    // ------
    // - A = log 2, B = log 0.5 (g = 0 at the event).
    // - C = -0.5 · 2 · 2 = -2.
    // - D = -0.3 · 2 · (1 - e^{-1}).
    // - loss = -2 - (A + B + C + D).
    fn loss_dim_matches_closed_form() {
        let (events, weights) = single_stream(array![1.0], 2.0);
        let layout = ParamLayout::new(1, 1, 1);
        let coeffs = array![0.5, 0.3, 2.0];
        let params = layout.view(coeffs.view()).unwrap();

        let a = 2.0_f64.ln();
        let b = 0.5_f64.ln();
        let c = -2.0;
        let d = -0.3 * 2.0 * (1.0 - (-1.0_f64).exp());
        let expected = -2.0 - (a + b + c + d);

        let got = loss_dim(0, &events, &weights, &params).unwrap();
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Non-positive intensity or link at an event is a domain error.
    fn loss_and_grad_reject_domain_violations() {
        let (events, weights) = single_stream(array![1.0, 1.5], 2.0);
        let layout = ParamLayout::new(1, 1, 1);

        let bad_mu = array![-0.1, 0.0, 1.0];
        let params = layout.view(bad_mu.view()).unwrap();
        let err = loss_dim(0, &events, &weights, &params).unwrap_err();
        assert!(matches!(err, HawkesError::NonPositiveIntensity { dim: 0, event: 1, .. }));

        let bad_link = array![0.5, 0.1, 0.0];
        let params = layout.view(bad_link.view()).unwrap();
        let err = loss_dim(0, &events, &weights, &params).unwrap_err();
        assert_eq!(err, HawkesError::NonPositiveLink { dim: 0, state: 0, value: 0.0 });

        let mut out = [0.0; 3];
        let (mu, rest) = out.split_at_mut(1);
        let (alpha, link) = rest.split_at_mut(1);
        let slot = GradSlot { dim: 0, baseline: &mut mu[0], interaction: alpha, link };
        let err = grad_dim(slot, &events, &weights, &params, BoundaryConvention::Exact)
            .unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    // Purpose
    // -------
    // Exact-convention partials equal central differences of `loss_dim`.
    //
    // Given
    // -----
    // - Two dims, two states, lagged two-component kernel, a state driver.
    // - Admissible coefficients (all > 0).
    //
    // Expect
    // ------
    // - Every raw partial of dim 0 matches -(d loss_dim / d θ) within 1e-5.
    fn grad_dim_matches_central_differences() {
        let modeled = vec![array![0.3, 1.1, 2.4, 3.0, 4.2], array![0.8, 1.9, 3.7]];
        let driver = array![1.5, 3.3];
        let events =
            MergedEvents::new(&modeled, &driver, &[0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1], 5.0, 2)
                .unwrap();
        let kernel = SumExpKernel::new(array![1.2, 0.4], array![0.1, 0.0]).unwrap();
        let weights = compute_weights(
            &events,
            &kernel,
            2,
            BoundaryConvention::Exact,
            &Executor::new(1).unwrap(),
        )
        .unwrap();
        let layout = ParamLayout::new(2, 2, 2);
        let coeffs = Array1::from_iter((0..layout.n_coeffs()).map(|k| 0.2 + 0.05 * k as f64));

        let mut out = Array1::<f64>::zeros(layout.n_coeffs());
        {
            let block = layout.alpha_block_len();
            let slice = out.as_slice_mut().unwrap();
            let (mu, rest) = slice.split_at_mut(2);
            let (alpha, link) = rest.split_at_mut(2 * block);
            let slot = GradSlot {
                dim: 0,
                baseline: &mut mu[0],
                interaction: &mut alpha[..block],
                link: &mut link[..2],
            };
            let params = layout.view(coeffs.view()).unwrap();
            grad_dim(slot, &events, &weights, &params, BoundaryConvention::Exact).unwrap();
        }

        let loss_at = |c: &Array1<f64>| {
            let params = layout.view(c.view()).unwrap();
            loss_dim(0, &events, &weights, &params).unwrap()
        };
        let h = 1e-6;
        let mut checked =
            vec![layout.baseline_index(0), layout.link_index(0, 0), layout.link_index(0, 1)];
        checked.extend((0..layout.alpha_block_len()).map(|k| layout.alpha_block_start(0) + k));
        for idx in checked {
            let mut up = coeffs.clone();
            let mut down = coeffs.clone();
            up[idx] += h;
            down[idx] -= h;
            let numeric = -(loss_at(&up) - loss_at(&down)) / (2.0 * h);
            assert_relative_eq!(out[idx], numeric, epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // The reference convention adds the terminal 1/den term to d/dmu.
    //
    // Given
    // -----
    // - One event at t = 1, T = 2, mu = 0.5, alpha = 0.3, f = 2.
    //
    // Expect
    // ------
    // - Reference d/dmu - Exact d/dmu = 1 / (0.5 + 0.3 · e^{-1}).
    fn reference_adds_terminal_step() {
        let (events, weights) = single_stream(array![1.0], 2.0);
        let layout = ParamLayout::new(1, 1, 1);
        let coeffs = array![0.5, 0.3, 2.0];
        let params = layout.view(coeffs.view()).unwrap();

        let run = |boundary| {
            let (mut mu, mut alpha, mut link) = (0.0, [0.0], [0.0]);
            let slot =
                GradSlot { dim: 0, baseline: &mut mu, interaction: &mut alpha, link: &mut link };
            grad_dim(slot, &events, &weights, &params, boundary).unwrap();
            mu
        };
        let diff = run(BoundaryConvention::Reference) - run(BoundaryConvention::Exact);
        assert_relative_eq!(diff, 1.0 / (0.5 + 0.3 * (-1.0_f64).exp()), epsilon = 1e-12);
    }
}
