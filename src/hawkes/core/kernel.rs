//! Sum-of-exponentials kernel with per-component lags.
//!
//! Component `u` is `φ_u(t) = decay_u · exp(−decay_u · (t − lag_u))` for
//! `t ≥ lag_u` and zero before, so every component integrates to one over
//! `[lag_u, ∞)`. The kernel is shared by every (target, source) pair; only the
//! interaction weights `alpha_{u,i,j}` differ.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use ndarray::Array1;

/// Decays and lags of the `U` exponential components.
///
/// Invariants: `decays.len() == lags.len() >= 1`, decays finite and `> 0`,
/// lags finite and `>= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SumExpKernel {
    decays: Array1<f64>,
    lags: Array1<f64>,
}

impl SumExpKernel {
    /// Build a validated kernel from parallel decay/lag arrays.
    ///
    /// # Errors
    /// - [`HawkesError::KernelLengthMismatch`] if the arrays differ in length.
    /// - [`HawkesError::EmptyKernel`] if they are empty.
    /// - [`HawkesError::InvalidDecay`] for the first decay that is non-finite or `<= 0`.
    /// - [`HawkesError::InvalidLag`] for the first lag that is non-finite or `< 0`.
    pub fn new(decays: Array1<f64>, lags: Array1<f64>) -> HawkesResult<Self> {
        if decays.len() != lags.len() {
            return Err(HawkesError::KernelLengthMismatch {
                decays: decays.len(),
                lags: lags.len(),
            });
        }
        if decays.is_empty() {
            return Err(HawkesError::EmptyKernel);
        }
        for (index, &value) in decays.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(HawkesError::InvalidDecay { index, value });
            }
        }
        for (index, &value) in lags.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(HawkesError::InvalidLag { index, value });
            }
        }
        Ok(SumExpKernel { decays, lags })
    }

    /// Kernel without delays: every lag is zero.
    pub fn without_lags(decays: Array1<f64>) -> HawkesResult<Self> {
        let lags = Array1::zeros(decays.len());
        SumExpKernel::new(decays, lags)
    }

    /// Number of exponential components `U`.
    pub fn n_kernels(&self) -> usize {
        self.decays.len()
    }

    pub fn decay(&self, u: usize) -> f64 {
        self.decays[u]
    }

    pub fn lag(&self, u: usize) -> f64 {
        self.lags[u]
    }

    pub fn decays(&self) -> &Array1<f64> {
        &self.decays
    }

    pub fn lags(&self) -> &Array1<f64> {
        &self.lags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A well-formed kernel keeps its components in order.
    //
    // Given
    // -----
    // - decays = [1.0, 3.0], lags = [0.0, 0.5].
    //
    // Expect
    // ------
    // - `n_kernels == 2` and accessors return the inputs.
    fn new_accepts_valid_components() {
        let kernel = SumExpKernel::new(array![1.0, 3.0], array![0.0, 0.5]).unwrap();
        assert_eq!(kernel.n_kernels(), 2);
        assert_eq!(kernel.decay(1), 3.0);
        assert_eq!(kernel.lag(1), 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Reject mismatched, empty, and out-of-domain specifications.
    fn new_rejects_invalid_components() {
        assert_eq!(
            SumExpKernel::new(array![1.0], array![0.0, 0.1]).unwrap_err(),
            HawkesError::KernelLengthMismatch { decays: 1, lags: 2 }
        );
        assert_eq!(
            SumExpKernel::new(array![], array![]).unwrap_err(),
            HawkesError::EmptyKernel
        );
        assert_eq!(
            SumExpKernel::new(array![1.0, 0.0], array![0.0, 0.0]).unwrap_err(),
            HawkesError::InvalidDecay { index: 1, value: 0.0 }
        );
        assert_eq!(
            SumExpKernel::new(array![1.0], array![-0.1]).unwrap_err(),
            HawkesError::InvalidLag { index: 0, value: -0.1 }
        );
        assert!(SumExpKernel::new(array![f64::NAN], array![0.0]).is_err());
    }

    #[test]
    // Purpose
    // -------
    // `without_lags` zero-fills the lag array.
    fn without_lags_zero_fills() {
        let kernel = SumExpKernel::without_lags(array![2.0, 4.0]).unwrap();
        assert_eq!(kernel.lags(), &array![0.0, 0.0]);
    }
}
