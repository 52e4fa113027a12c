//! Errors for lagged sum-of-exponentials Hawkes models (binding, configuration,
//! coefficient shape, and intensity domain violations).
//!
//! This module defines the model error type, [`HawkesError`], used across the
//! Rust core and the optional Python bindings. It implements `Display`/`Error`
//! and converts to `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy). Stream indices refer to the
//!   order in which streams were passed to `bind`; the auxiliary
//!   state-driving stream is reported with index `n_dims`.
//! - Event indices in domain errors refer to the merged timeline, where index
//!   `0` is the virtual start event at `t = 0`.
//! - Errors are split into two families that callers can query with
//!   [`HawkesError::is_invalid_state`] and [`HawkesError::is_domain_error`]:
//!   *invalid state* (nothing usable is bound) and *domain* (the coefficient
//!   vector leaves the admissible region). Everything else is configuration
//!   or shape misuse.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// Crate-wide result alias for Hawkes operations that may produce [`HawkesError`].
pub type HawkesResult<T> = Result<T, HawkesError>;

/// Unified error type for Hawkes likelihood evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum HawkesError {
    // ---- Invalid state (binding) ----
    /// `loss`/`grad` called before any data was bound.
    NotBound,

    /// No modeled dimension remains once the state-driving stream is set aside.
    ZeroDimensions,

    /// A timestamp is NaN/±inf or negative.
    InvalidTimestamp { stream: usize, index: usize, value: f64 },

    /// A stream is not sorted in non-decreasing order.
    UnsortedStream { stream: usize, index: usize },

    /// State-index sequence must have one entry per merged event plus one.
    StateLengthMismatch { expected: usize, actual: usize },

    /// A state index is outside the link-function table.
    StateOutOfRange { index: usize, state: usize, n_states: usize },

    /// Horizon must be finite and not earlier than the last event.
    InvalidHorizon { horizon: f64, last_event: f64 },

    /// Modeled streams carry no event at all; the per-event normalizer is zero.
    NoEvents,

    // ---- Configuration ----
    /// Kernel decays must be finite and > 0.
    InvalidDecay { index: usize, value: f64 },

    /// Kernel lags must be finite and >= 0.
    InvalidLag { index: usize, value: f64 },

    /// Decays and lags must be parallel arrays.
    KernelLengthMismatch { decays: usize, lags: usize },

    /// At least one exponential component is required.
    EmptyKernel,

    /// The link-function table must have at least one state.
    InvalidStateCount { n_states: usize },

    /// Worker pool size must be at least one.
    InvalidThreadCount { n_threads: usize },

    /// Worker pool construction failed.
    ThreadPool { reason: String },

    // ---- Coefficient shape ----
    /// Coefficient vector length does not match `D + D²·U + D·S`.
    CoeffLengthMismatch { expected: usize, actual: usize },

    /// Gradient output buffer length does not match the coefficient count.
    OutputLengthMismatch { expected: usize, actual: usize },

    // ---- Domain ----
    /// `mu_i + Σ alpha·g` is not strictly positive at an event of dimension `dim`.
    NonPositiveIntensity { dim: usize, event: usize, value: f64 },

    /// `f_i[n]` is not strictly positive at a state visited by an event of `dim`.
    NonPositiveLink { dim: usize, state: usize, value: f64 },
}

impl HawkesError {
    /// `true` for errors raised because no usable data is bound.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            HawkesError::NotBound
                | HawkesError::ZeroDimensions
                | HawkesError::InvalidTimestamp { .. }
                | HawkesError::UnsortedStream { .. }
                | HawkesError::StateLengthMismatch { .. }
                | HawkesError::StateOutOfRange { .. }
                | HawkesError::InvalidHorizon { .. }
                | HawkesError::NoEvents
        )
    }

    /// `true` for errors raised because the coefficients leave the admissible region.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            HawkesError::NonPositiveIntensity { .. } | HawkesError::NonPositiveLink { .. }
        )
    }
}

impl std::error::Error for HawkesError {}

impl std::fmt::Display for HawkesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Invalid state (binding) ----
            HawkesError::NotBound => {
                write!(f, "No data bound; call bind with valid timestamps before evaluating.")
            }
            HawkesError::ZeroDimensions => {
                write!(f, "At least one modeled stream is required besides the state-driving stream.")
            }
            HawkesError::InvalidTimestamp { stream, index, value } => {
                write!(
                    f,
                    "Timestamp at index {index} of stream {stream} must be finite and >= 0; got: {value}"
                )
            }
            HawkesError::UnsortedStream { stream, index } => {
                write!(f, "Stream {stream} is not sorted: timestamp at index {index} decreases.")
            }
            HawkesError::StateLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "State-index sequence must have one entry per event plus one: expected {expected}, got {actual}"
                )
            }
            HawkesError::StateOutOfRange { index, state, n_states } => {
                write!(
                    f,
                    "State index {state} at position {index} exceeds the link table size ({n_states})."
                )
            }
            HawkesError::InvalidHorizon { horizon, last_event } => {
                write!(
                    f,
                    "Horizon must be finite and >= the last event time ({last_event}); got: {horizon}"
                )
            }
            HawkesError::NoEvents => {
                write!(f, "Modeled streams contain no events.")
            }
            // ---- Configuration ----
            HawkesError::InvalidDecay { index, value } => {
                write!(f, "Decay at index {index} must be finite and > 0; got: {value}")
            }
            HawkesError::InvalidLag { index, value } => {
                write!(f, "Lag at index {index} must be finite and >= 0; got: {value}")
            }
            HawkesError::KernelLengthMismatch { decays, lags } => {
                write!(f, "Kernel decays ({decays}) and lags ({lags}) must have the same length.")
            }
            HawkesError::EmptyKernel => {
                write!(f, "Kernel must have at least one exponential component.")
            }
            HawkesError::InvalidStateCount { n_states } => {
                write!(f, "Link table size must be >= 1; got: {n_states}")
            }
            HawkesError::InvalidThreadCount { n_threads } => {
                write!(f, "Thread count must be >= 1; got: {n_threads}")
            }
            HawkesError::ThreadPool { reason } => {
                write!(f, "Failed to build worker pool: {reason}")
            }
            // ---- Coefficient shape ----
            HawkesError::CoeffLengthMismatch { expected, actual } => {
                write!(f, "Coefficient length mismatch: expected {expected}, got {actual}")
            }
            HawkesError::OutputLengthMismatch { expected, actual } => {
                write!(f, "Gradient output length mismatch: expected {expected}, got {actual}")
            }
            // ---- Domain ----
            HawkesError::NonPositiveIntensity { dim, event, value } => {
                write!(
                    f,
                    "Non-positive intensity for dimension {dim} at event {event}: {value}. \
                     The coefficients leave the admissible region; constrain the optimizer \
                     (e.g., a positivity projection) or start from an admissible point."
                )
            }
            HawkesError::NonPositiveLink { dim, state, value } => {
                write!(
                    f,
                    "Non-positive link value for dimension {dim} at state {state}: {value}"
                )
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<HawkesError> for PyErr {
    fn from(err: HawkesError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
