//! Event merge — one global timeline from per-dimension timestamp streams.
//!
//! Purpose
//! -------
//! Validate raw timestamp streams at the binding boundary and merge them into
//! the single, time-ordered event sequence every recursion in this crate runs
//! over. The merged timeline carries, for each event, its origin stream and
//! the externally supplied discrete state in force right after it.
//!
//! Key behaviors
//! -------------
//! - [`MergedEvents::new`] takes the `D` modeled streams and the auxiliary
//!   state-driving stream as **separate, named** arguments. The auxiliary
//!   stream's events are merged into the timeline (they delimit state
//!   intervals) but are labelled with stream `D + 1` and never excite.
//! - Timestamps are concatenated with their 1-based stream label and stable
//!   sorted by time, so simultaneous events keep stream order.
//! - A virtual start event at `t_0 = 0` with label `0` is prepended; the
//!   horizon `T` plays the role of `t_{M+1}`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All timestamps are finite and `>= 0`; every stream is non-decreasing.
//! - `states.len() == M + 1` and every state is `< n_states`.
//! - `T` is finite and `>= t_M`.
//! - `total_events` (events of the modeled streams only) is `> 0`.
//!
//! Conventions
//! -----------
//! - Event index `k` runs over `0..=M`; `k = M + 1` denotes the horizon.
//! - `states[k]` is the state on `[t_k, t_{k+1})`, so the state seen by the
//!   interval ending at `t_k` is `states[k - 1]`.
//! - Stream labels in [`MergedEvents::types`] are 1-based: label `i + 1`
//!   means modeled dimension `i`, label `D + 1` the state-driving stream.
//!
//! Testing notes
//! -------------
//! - Unit tests cover ordering and labelling of the merge, tie handling, the
//!   `total_events` normalizer, and every validation failure.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use ndarray::Array1;
use tracing::debug;

/// `MergedEvents` — validated, globally ordered event timeline.
///
/// Fields
/// ------
/// - `timestamps`: `Array1<f64>` of length `M + 1`, `timestamps[0] = 0`.
/// - `types`: `Array1<usize>` of length `M + 1`, 1-based stream labels with
///   `types[0] = 0`.
/// - `states`: `Array1<usize>` of length `M + 1`, carried through unchanged.
/// - `counts`: `Array1<usize>` of length `D + 1`, events per stream (last
///   entry is the state-driving stream).
/// - `horizon`: `f64`, end of the observation window `T`.
/// - `n_dims`: `usize`, number of modeled dimensions `D`.
/// - `total_events`: `usize`, events of the modeled streams only.
///
/// Performance
/// -----------
/// - Construction is `O(M log M)` (one stable sort); all accessors are O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEvents {
    pub timestamps: Array1<f64>,
    pub types: Array1<usize>,
    pub states: Array1<usize>,
    pub counts: Array1<usize>,
    pub horizon: f64,
    pub n_dims: usize,
    pub total_events: usize,
}

impl MergedEvents {
    /// Validate the streams and build the merged timeline.
    ///
    /// Parameters
    /// ----------
    /// - `modeled`: `&[Array1<f64>]`
    ///   One sorted timestamp stream per modeled dimension (`D >= 1`).
    /// - `state_driver`: `&Array1<f64>`
    ///   Sorted timestamps of the auxiliary stream that drives state changes.
    ///   May be empty.
    /// - `states`: `&[usize]`
    ///   State index in force after each merged event, length `M + 1`
    ///   (`M` counts the events of all streams, state-driving included).
    /// - `horizon`: `f64`
    ///   Observation horizon `T`.
    /// - `n_states`: `usize`
    ///   Link-table size `S`; every state must be `< n_states`.
    ///
    /// Returns
    /// -------
    /// `HawkesResult<MergedEvents>`
    ///
    /// Errors
    /// ------
    /// - `HawkesError::ZeroDimensions` when `modeled` is empty.
    /// - `HawkesError::InvalidTimestamp` for a non-finite or negative time.
    /// - `HawkesError::UnsortedStream` for the first decreasing timestamp.
    /// - `HawkesError::StateLengthMismatch` when `states.len() != M + 1`.
    /// - `HawkesError::StateOutOfRange` for the first state `>= n_states`.
    /// - `HawkesError::InvalidHorizon` when `T` is non-finite or `< t_M`.
    /// - `HawkesError::NoEvents` when the modeled streams are all empty.
    pub fn new(
        modeled: &[Array1<f64>], state_driver: &Array1<f64>, states: &[usize], horizon: f64,
        n_states: usize,
    ) -> HawkesResult<Self> {
        let n_dims = modeled.len();
        if n_dims == 0 {
            return Err(HawkesError::ZeroDimensions);
        }

        let streams = modeled.iter().chain(std::iter::once(state_driver));
        for (stream, ts) in streams.clone().enumerate() {
            validate_stream(stream, ts)?;
        }

        let counts: Array1<usize> = streams.clone().map(|ts| ts.len()).collect();
        let n_events: usize = counts.sum();
        let total_events = n_events - counts[n_dims];

        if states.len() != n_events + 1 {
            return Err(HawkesError::StateLengthMismatch {
                expected: n_events + 1,
                actual: states.len(),
            });
        }
        if let Some((index, &state)) = states.iter().enumerate().find(|(_, s)| **s >= n_states) {
            return Err(HawkesError::StateOutOfRange { index, state, n_states });
        }

        let mut labelled: Vec<(f64, usize)> = Vec::with_capacity(n_events);
        for (stream, ts) in streams.enumerate() {
            labelled.extend(ts.iter().map(|&t| (t, stream + 1)));
        }
        // `sort_by` is stable: ties keep stream order.
        labelled.sort_by(|a, b| a.0.total_cmp(&b.0));

        let last_event = labelled.last().map_or(0.0, |&(t, _)| t);
        if !horizon.is_finite() || horizon < last_event {
            return Err(HawkesError::InvalidHorizon { horizon, last_event });
        }
        if total_events == 0 {
            return Err(HawkesError::NoEvents);
        }

        let mut timestamps = Array1::<f64>::zeros(n_events + 1);
        let mut types = Array1::<usize>::zeros(n_events + 1);
        for (k, (t, label)) in labelled.into_iter().enumerate() {
            timestamps[k + 1] = t;
            types[k + 1] = label;
        }

        debug!(
            n_dims,
            n_events,
            total_events,
            state_driver_events = counts[n_dims],
            horizon,
            "merged event streams"
        );

        Ok(MergedEvents {
            timestamps,
            types,
            states: Array1::from(states.to_vec()),
            counts,
            horizon,
            n_dims,
            total_events,
        })
    }

    /// Number of merged events `M` (virtual start excluded).
    pub fn n_events(&self) -> usize {
        self.timestamps.len() - 1
    }

    /// `t_k` for `k in 0..=M`, and `T` for `k == M + 1`.
    #[inline]
    pub fn time(&self, k: usize) -> f64 {
        if k == self.timestamps.len() { self.horizon } else { self.timestamps[k] }
    }

    /// Length of the interval `[t_{k-1}, t_k)` for `k in 1..=M + 1`.
    #[inline]
    pub fn interval(&self, k: usize) -> f64 {
        self.time(k) - self.timestamps[k - 1]
    }

    /// State in force on `[t_{k-1}, t_k)` for `k in 1..=M + 1`.
    #[inline]
    pub fn state_before(&self, k: usize) -> usize {
        self.states[k - 1]
    }

    /// Whether merged event `k` belongs to modeled dimension `dim`.
    #[inline]
    pub fn is_event_of(&self, k: usize, dim: usize) -> bool {
        self.types[k] == dim + 1
    }
}

// ---- Helper methods ----

/// Check one stream for finiteness, non-negativity and ordering.
fn validate_stream(stream: usize, ts: &Array1<f64>) -> HawkesResult<()> {
    let mut previous = 0.0_f64;
    for (index, &value) in ts.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(HawkesError::InvalidTimestamp { stream, index, value });
        }
        if index > 0 && value < previous {
            return Err(HawkesError::UnsortedStream { stream, index });
        }
        previous = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Ordering and stream labelling of the merged timeline.
    // - `total_events` excluding the state-driving stream.
    // - Every validation failure of `MergedEvents::new`.
    //
    // They intentionally DO NOT cover:
    // - Kernel recursions built on top of the timeline.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Merge two modeled streams and one state-driving stream.
    //
    // Given
    // -----
    // - dim 0 at {1, 3}, dim 1 at {2}, state driver at {2.5}.
    // - states = [0, 0, 1, 1, 0], horizon 4.
    //
    // Expect
    // ------
    // - timestamps = [0, 1, 2, 2.5, 3], types = [0, 1, 2, 3, 1].
    // - total_events = 3 (state-driving event excluded), counts = [2, 1, 1].
    fn merge_orders_and_labels_events() {
        let modeled = vec![array![1.0, 3.0], array![2.0]];
        let driver = array![2.5];
        let states = [0, 0, 1, 1, 0];

        let merged = MergedEvents::new(&modeled, &driver, &states, 4.0, 2).unwrap();

        assert_eq!(merged.timestamps, array![0.0, 1.0, 2.0, 2.5, 3.0]);
        assert_eq!(merged.types, array![0, 1, 2, 3, 1]);
        assert_eq!(merged.counts, array![2, 1, 1]);
        assert_eq!(merged.total_events, 3);
        assert_eq!(merged.n_events(), 4);
        assert_eq!(merged.n_dims, 2);
        assert_eq!(merged.time(5), 4.0);
        assert_eq!(merged.interval(5), 1.0);
        assert_eq!(merged.state_before(4), 1);
        assert!(merged.is_event_of(4, 0));
        assert!(!merged.is_event_of(3, 0));
    }

    #[test]
    // Purpose
    // -------
    // Simultaneous events keep the order of the streams they came from.
    fn merge_is_stable_on_ties() {
        let modeled = vec![array![1.0], array![1.0], array![0.5]];
        let driver = array![];
        let merged = MergedEvents::new(&modeled, &driver, &[0; 4], 2.0, 1).unwrap();
        assert_eq!(merged.types, array![0, 3, 1, 2]);
    }

    #[test]
    // Purpose
    // -------
    // `total_events` equals the sum of modeled counts for an arbitrary layout.
    fn total_events_excludes_state_driver() {
        let modeled = vec![array![0.1, 0.2, 0.3], array![], array![0.15, 0.9]];
        let driver = array![0.05, 0.5, 0.7, 0.8];
        let n = 3 + 2 + 4;
        let merged = MergedEvents::new(&modeled, &driver, &vec![0; n + 1], 1.0, 1).unwrap();
        assert_eq!(merged.total_events, 5);
        assert_eq!(merged.n_events(), n);
    }

    #[test]
    // Purpose
    // -------
    // Reject each malformed binding with the matching invalid-state error.
    fn new_rejects_invalid_inputs() {
        let driver = array![];

        let err = MergedEvents::new(&[], &driver, &[0], 1.0, 1).unwrap_err();
        assert_eq!(err, HawkesError::ZeroDimensions);

        let err = MergedEvents::new(&[array![1.0, 0.5]], &driver, &[0; 3], 2.0, 1).unwrap_err();
        assert_eq!(err, HawkesError::UnsortedStream { stream: 0, index: 1 });

        let err = MergedEvents::new(&[array![-1.0]], &driver, &[0; 2], 2.0, 1).unwrap_err();
        assert_eq!(err, HawkesError::InvalidTimestamp { stream: 0, index: 0, value: -1.0 });

        let err = MergedEvents::new(&[array![1.0]], &array![0.5, 0.2], &[0; 4], 2.0, 1)
            .unwrap_err();
        assert_eq!(err, HawkesError::UnsortedStream { stream: 1, index: 1 });

        let err = MergedEvents::new(&[array![1.0]], &driver, &[0; 3], 2.0, 1).unwrap_err();
        assert_eq!(err, HawkesError::StateLengthMismatch { expected: 2, actual: 3 });

        let err = MergedEvents::new(&[array![1.0]], &driver, &[0, 2], 2.0, 2).unwrap_err();
        assert_eq!(err, HawkesError::StateOutOfRange { index: 1, state: 2, n_states: 2 });

        let err = MergedEvents::new(&[array![1.0]], &driver, &[0, 0], 0.5, 1).unwrap_err();
        assert_eq!(err, HawkesError::InvalidHorizon { horizon: 0.5, last_event: 1.0 });

        let err = MergedEvents::new(&[array![]], &array![0.5], &[0, 0], 1.0, 1).unwrap_err();
        assert_eq!(err, HawkesError::NoEvents);
    }
}
