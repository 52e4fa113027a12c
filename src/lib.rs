//! rust_pointprocess — Hawkes-process likelihoods with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the Hawkes likelihood to Python via the `_rust_pointprocess` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing class and submodule used by the `rust_pointprocess`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`hawkes` and `optimization`) as the
//!   public crate surface.
//! - Define the `#[pyclass]` wrapper for `HawkesSumExpLag` and the
//!   `#[pymodule]` initializer for `_rust_pointprocess`.
//! - Register the `rust_pointprocess.hawkes` submodule in `sys.modules` so
//!   that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Loss and gradient evaluations release the GIL; the wrapped model is
//!   `Send + Sync` and never mutated by an evaluation.
//!
//! Conventions
//! -----------
//! - Errors from the core are rich Rust enums internally and become
//!   `ValueError` at the PyO3 boundary; malformed Python inputs raise
//!   `TypeError`.
//! - Coefficient vectors follow `hawkes::ParamLayout` on both sides.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends on `hawkes` / `optimization` directly and can
//!   ignore the items guarded by the `python-bindings` feature.
//! - Python users pass `loss` / `grad` to `scipy.optimize.minimize` (or any
//!   optimizer accepting a value and a Jacobian callable).

pub mod hawkes;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    hawkes::{HawkesOptions, HawkesSumExpLag, SumExpKernel},
    utils::{extract_owned_f64, extract_states, extract_streams},
};

/// HawkesSumExpLag — Python-facing wrapper for the lagged Hawkes likelihood.
///
/// Constructed from Python via
/// `HawkesSumExpLag(decays, lags, n_states, n_threads=1)`, then bound to data
/// with `bind(timestamps, state_driver, states, horizon)`. `loss(coeffs)`
/// and `grad(coeffs)` evaluate the normalized negative log-likelihood and its
/// gradient.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_pointprocess.hawkes", name = "HawkesSumExpLag")]
pub struct PyHawkesSumExpLag {
    inner: HawkesSumExpLag,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyHawkesSumExpLag {
    #[new]
    #[pyo3(
        signature = (decays, lags, n_states, n_threads = 1),
        text_signature = "(decays, lags, n_states, /, n_threads=1)"
    )]
    pub fn new<'py>(
        py: Python<'py>, decays: &Bound<'py, PyAny>, lags: &Bound<'py, PyAny>, n_states: usize,
        n_threads: usize,
    ) -> PyResult<Self> {
        let kernel =
            SumExpKernel::new(extract_owned_f64(py, decays)?, extract_owned_f64(py, lags)?)?;
        let options = HawkesOptions::with_threads(n_threads)?;
        let inner = HawkesSumExpLag::new(kernel, n_states, options)?;
        Ok(PyHawkesSumExpLag { inner })
    }

    /// Bind event data; `timestamps` is a sequence of one array per dimension.
    #[pyo3(text_signature = "(self, timestamps, state_driver, states, horizon)")]
    pub fn bind<'py>(
        &mut self, py: Python<'py>, timestamps: &Bound<'py, PyAny>,
        state_driver: &Bound<'py, PyAny>, states: &Bound<'py, PyAny>, horizon: f64,
    ) -> PyResult<()> {
        let modeled = extract_streams(py, timestamps)?;
        let driver = extract_owned_f64(py, state_driver)?;
        let states = extract_states(states)?;
        self.inner.bind(&modeled, &driver, &states, horizon)?;
        Ok(())
    }

    #[pyo3(text_signature = "(self, coeffs)")]
    pub fn loss<'py>(&self, py: Python<'py>, coeffs: &Bound<'py, PyAny>) -> PyResult<f64> {
        let coeffs = extract_owned_f64(py, coeffs)?;
        let value = py.allow_threads(|| self.inner.loss(coeffs.view()))?;
        Ok(value)
    }

    #[pyo3(text_signature = "(self, coeffs)")]
    pub fn grad<'py>(
        &self, py: Python<'py>, coeffs: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let coeffs = extract_owned_f64(py, coeffs)?;
        let grad = py.allow_threads(|| {
            let mut out = ndarray::Array1::zeros(coeffs.len());
            self.inner.grad(coeffs.view(), out.view_mut()).map(|()| out)
        })?;
        Ok(grad.into_pyarray(py))
    }

    #[getter]
    pub fn n_coeffs(&self) -> usize {
        self.inner.n_coeffs()
    }

    #[getter]
    pub fn total_events(&self) -> usize {
        self.inner.total_events()
    }

    #[getter]
    pub fn n_dims(&self) -> usize {
        self.inner.n_dims()
    }
}

/// Initialize the `_rust_pointprocess` extension and its `hawkes` submodule.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_pointprocess<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let hawkes_mod = PyModule::new(_py, "hawkes")?;
    hawkes_models(_py, m, &hawkes_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_pointprocess.hawkes", hawkes_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn hawkes_models<'py>(
    _py: Python, rust_pointprocess: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyHawkesSumExpLag>()?;
    rust_pointprocess.add_submodule(m)?;
    Ok(())
}
