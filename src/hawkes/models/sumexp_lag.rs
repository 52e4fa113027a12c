//! Lagged sum-of-exponentials Hawkes model with a state-indexed link.
//!
//! This module wires the coefficient-independent pieces (merged events,
//! kernel, cached weights) to the per-dimension loss and gradient kernels and
//! exposes the evaluation surface used by optimizers:
//!
//! - [`HawkesSumExpLag::bind`] validates and merges the event streams and
//!   invalidates any cached weights.
//! - The weight cache is built lazily on the first `loss`/`grad` request
//!   after a bind and then reused for every coefficient vector.
//! - `loss` and `grad` fan out one task per dimension over the configured
//!   pool and normalize by the number of modeled events.
//!
//! Evaluation is `&self` and side-effect free once the cache exists, so a
//! bound model can be shared across optimizer threads.
use crate::hawkes::{
    core::{
        data::MergedEvents,
        executor::Executor,
        kernel::SumExpKernel,
        options::HawkesOptions,
        params::{HawkesParams, ParamLayout},
        recursion::compute_weights,
        weights::KernelWeights,
    },
    errors::{HawkesError, HawkesResult},
    models::loglik::{GradSlot, grad_dim, loss_dim},
};
use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Hawkes model: kernel, link-table size, options, and bound data.
///
/// # Notes
/// - `events` is `None` until [`bind`](Self::bind) succeeds; every
///   evaluation before that returns [`HawkesError::NotBound`].
/// - `weights` is reset on each bind and filled on first use.
#[derive(Debug, Clone)]
pub struct HawkesSumExpLag {
    kernel: SumExpKernel,
    n_states: usize,
    options: HawkesOptions,
    executor: Executor,
    events: Option<MergedEvents>,
    weights: OnceLock<KernelWeights>,
}

impl HawkesSumExpLag {
    /// Construct an unbound model.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidStateCount`] if `n_states == 0`.
    /// - [`HawkesError::InvalidThreadCount`] / [`HawkesError::ThreadPool`]
    ///   from building the worker pool.
    pub fn new(
        kernel: SumExpKernel, n_states: usize, options: HawkesOptions,
    ) -> HawkesResult<Self> {
        if n_states == 0 {
            return Err(HawkesError::InvalidStateCount { n_states });
        }
        let executor = Executor::new(options.n_threads)?;
        Ok(HawkesSumExpLag {
            kernel,
            n_states,
            options,
            executor,
            events: None,
            weights: OnceLock::new(),
        })
    }

    /// Validate and merge event data, replacing anything bound before.
    ///
    /// # Arguments
    /// - `modeled`: one sorted timestamp stream per modeled dimension.
    /// - `state_driver`: sorted timestamps of the auxiliary stream; its events
    ///   change the state but never excite.
    /// - `states`: state index after each merged event (`M + 1` entries).
    /// - `horizon`: end of the observation window.
    ///
    /// # Errors
    /// Any invalid-state error of `MergedEvents::new`. On error the previous
    /// binding is left untouched.
    pub fn bind(
        &mut self, modeled: &[Array1<f64>], state_driver: &Array1<f64>, states: &[usize],
        horizon: f64,
    ) -> HawkesResult<()> {
        let events = MergedEvents::new(modeled, state_driver, states, horizon, self.n_states)?;
        self.events = Some(events);
        self.weights = OnceLock::new();
        debug!(n_dims = modeled.len(), n_coeffs = self.n_coeffs(), "bound event data");
        Ok(())
    }

    /// Normalized negative log-likelihood at `coeffs`.
    ///
    /// # Errors
    /// - [`HawkesError::NotBound`] before a successful bind.
    /// - [`HawkesError::CoeffLengthMismatch`] for a wrongly sized vector.
    /// - A domain error from the first failing dimension.
    pub fn loss(&self, coeffs: ArrayView1<'_, f64>) -> HawkesResult<f64> {
        let events = self.bound_events()?;
        let params = self.params(coeffs)?;
        let weights = self.weights()?;

        let per_dim =
            self.executor.try_map(events.n_dims, |i| loss_dim(i, events, weights, &params))?;
        let value = per_dim.iter().sum::<f64>() / events.total_events as f64;
        trace!(value, "loss evaluated");
        Ok(value)
    }

    /// Gradient of [`loss`](Self::loss) written into `out`.
    ///
    /// `out` must have length [`n_coeffs`](Self::n_coeffs); it is zeroed on
    /// entry. If a dimension task fails, `out` is left all zeros rather than
    /// partly written.
    ///
    /// # Errors
    /// As [`loss`](Self::loss), plus [`HawkesError::OutputLengthMismatch`].
    pub fn grad(
        &self, coeffs: ArrayView1<'_, f64>, mut out: ArrayViewMut1<'_, f64>,
    ) -> HawkesResult<()> {
        let events = self.bound_events()?;
        let params = self.params(coeffs)?;
        let n_coeffs = params.layout().n_coeffs();
        if out.len() != n_coeffs {
            return Err(HawkesError::OutputLengthMismatch { expected: n_coeffs, actual: out.len() });
        }
        let weights = self.weights()?;

        let filled = match out.as_slice_mut() {
            Some(buf) => self.grad_into(buf, events, weights, &params),
            None => {
                let mut buf = vec![0.0; n_coeffs];
                self.grad_into(&mut buf, events, weights, &params)
                    .map(|()| out.assign(&ArrayView1::from(&buf)))
            }
        };
        if let Err(err) = filled {
            out.fill(0.0);
            return Err(err);
        }
        trace!(n_coeffs, "gradient evaluated");
        Ok(())
    }

    /// Loss and gradient at `coeffs` in one call.
    pub fn loss_and_grad(
        &self, coeffs: ArrayView1<'_, f64>,
    ) -> HawkesResult<(f64, Array1<f64>)> {
        let value = self.loss(coeffs)?;
        let mut grad = Array1::zeros(coeffs.len());
        self.grad(coeffs, grad.view_mut())?;
        Ok((value, grad))
    }

    /// Typed view over `coeffs` for the bound dimension count.
    pub fn params<'a>(&self, coeffs: ArrayView1<'a, f64>) -> HawkesResult<HawkesParams<'a>> {
        self.layout()?.view(coeffs)
    }

    /// Coefficient layout; needs bound data for `D`.
    pub fn layout(&self) -> HawkesResult<ParamLayout> {
        let events = self.bound_events()?;
        Ok(ParamLayout::new(events.n_dims, self.kernel.n_kernels(), self.n_states))
    }

    /// Cached kernel weights, computing them on first access after a bind.
    pub fn weights(&self) -> HawkesResult<&KernelWeights> {
        if let Some(weights) = self.weights.get() {
            return Ok(weights);
        }
        let events = self.bound_events()?;
        let computed = compute_weights(
            events,
            &self.kernel,
            self.n_states,
            self.options.boundary,
            &self.executor,
        )?;
        Ok(self.weights.get_or_init(|| computed))
    }

    /// Number of modeled dimensions `D` (0 while unbound).
    pub fn n_dims(&self) -> usize {
        self.events.as_ref().map_or(0, |e| e.n_dims)
    }

    pub fn n_kernels(&self) -> usize {
        self.kernel.n_kernels()
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Length of the coefficient vector (0 while unbound).
    pub fn n_coeffs(&self) -> usize {
        self.layout().map_or(0, |l| l.n_coeffs())
    }

    /// Events of the modeled streams (0 while unbound).
    pub fn total_events(&self) -> usize {
        self.events.as_ref().map_or(0, |e| e.total_events)
    }

    pub fn kernel(&self) -> &SumExpKernel {
        &self.kernel
    }

    pub fn options(&self) -> &HawkesOptions {
        &self.options
    }

    pub fn events(&self) -> Option<&MergedEvents> {
        self.events.as_ref()
    }

    // ---- Helper methods ----

    fn bound_events(&self) -> HawkesResult<&MergedEvents> {
        self.events.as_ref().ok_or(HawkesError::NotBound)
    }

    /// Split `buf` into per-dimension slots, run the tasks, then normalize.
    fn grad_into(
        &self, buf: &mut [f64], events: &MergedEvents, weights: &KernelWeights,
        params: &HawkesParams<'_>,
    ) -> HawkesResult<()> {
        buf.fill(0.0);
        let layout = *params.layout();
        let (baselines, rest) = buf.split_at_mut(layout.n_dims);
        let (interactions, links) = rest.split_at_mut(layout.n_dims * layout.alpha_block_len());

        let slots: Vec<GradSlot<'_>> = baselines
            .iter_mut()
            .zip(interactions.chunks_mut(layout.alpha_block_len()))
            .zip(links.chunks_mut(layout.n_states))
            .enumerate()
            .map(|(dim, ((baseline, interaction), link))| GradSlot {
                dim,
                baseline,
                interaction,
                link,
            })
            .collect();

        let boundary = self.options.boundary;
        self.executor
            .try_for_each(slots, |slot| grad_dim(slot, events, weights, params, boundary))?;

        let total = events.total_events as f64;
        buf.iter_mut().for_each(|v| *v = -*v / total);
        Ok(())
    }
}
