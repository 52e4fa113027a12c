//! Conversion helpers for the Python bindings.
//!
//! Everything here turns loosely typed Python inputs (NumPy arrays, pandas
//! Series, plain sequences) into the owned `ndarray` containers the Rust core
//! expects. Only compiled with the `python-bindings` feature.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Borrow a contiguous `float64` view of a 1-D array-like, copying only when
/// the input is not already a contiguous NumPy array.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of a 1-D `float64` array-like.
#[cfg(feature = "python-bindings")]
pub fn extract_owned_f64<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Array1<f64>> {
    Ok(extract_f64_array(py, raw_data)?.as_array().to_owned())
}

/// One owned timestamp array per element of a Python sequence of array-likes.
#[cfg(feature = "python-bindings")]
pub fn extract_streams<'py>(
    py: Python<'py>, raw_streams: &Bound<'py, PyAny>,
) -> PyResult<Vec<Array1<f64>>> {
    let items: Vec<Bound<'py, PyAny>> = raw_streams.extract().map_err(|_| {
        PyTypeError::new_err("timestamps must be a sequence of 1-D float64 array-likes")
    })?;
    items.iter().map(|item| extract_owned_f64(py, item)).collect()
}

/// State indices from a sequence or integer NumPy array.
#[cfg(feature = "python-bindings")]
pub fn extract_states(raw_states: &Bound<'_, PyAny>) -> PyResult<Vec<usize>> {
    raw_states.extract().map_err(|_| {
        PyTypeError::new_err("states must be a 1-D sequence of non-negative integers")
    })
}
