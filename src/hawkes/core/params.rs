//! Parameter layout and typed views over the flat coefficient vector.
//!
//! Purpose
//! -------
//! The external optimizer sees one flat `f64` vector. Everything inside the
//! crate reads it through [`ParamLayout`] (offset arithmetic, computed once
//! from `(D, U, S)`) and [`HawkesParams`] (named, borrowed accessors), so no
//! evaluator carries its own index formulas.
//!
//! Layout
//! ------
//! ```text
//! [ mu_0 .. mu_{D-1} | alpha block of dim 0 | ... | alpha block of dim D-1 | f_0[0..S) | ... | f_{D-1}[0..S) ]
//! alpha block of dim i (length U·D):   alpha_{u,i,j} at u·D + j
//! ```
//! Every per-dimension block is contiguous, which lets the gradient pass hand
//! each dimension task its own `&mut` slices.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use ndarray::{ArrayView1, s};

/// Offsets of the `mu`, `alpha` and `f` blocks for a `(D, U, S)` model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    pub n_dims: usize,
    pub n_kernels: usize,
    pub n_states: usize,
}

impl ParamLayout {
    pub fn new(n_dims: usize, n_kernels: usize, n_states: usize) -> Self {
        ParamLayout { n_dims, n_kernels, n_states }
    }

    /// Total length `D + D²·U + D·S`.
    pub fn n_coeffs(&self) -> usize {
        self.n_dims + self.n_dims * self.alpha_block_len() + self.n_dims * self.n_states
    }

    /// Length `U·D` of one dimension's interaction block.
    #[inline]
    pub fn alpha_block_len(&self) -> usize {
        self.n_kernels * self.n_dims
    }

    #[inline]
    pub fn baseline_index(&self, i: usize) -> usize {
        i
    }

    /// First index of the alpha block of dimension `i`.
    #[inline]
    pub fn alpha_block_start(&self, i: usize) -> usize {
        self.n_dims + i * self.alpha_block_len()
    }

    #[inline]
    pub fn interaction_index(&self, u: usize, i: usize, j: usize) -> usize {
        self.alpha_block_start(i) + u * self.n_dims + j
    }

    /// First index of the whole link section (`f_0[0]`).
    #[inline]
    pub fn link_section_start(&self) -> usize {
        self.n_dims + self.n_dims * self.alpha_block_len()
    }

    #[inline]
    pub fn link_index(&self, i: usize, n: usize) -> usize {
        self.link_section_start() + i * self.n_states + n
    }

    /// Wrap `coeffs` into a typed view after checking its length.
    ///
    /// # Errors
    /// - [`HawkesError::CoeffLengthMismatch`] if `coeffs.len() != self.n_coeffs()`.
    pub fn view<'a>(&self, coeffs: ArrayView1<'a, f64>) -> HawkesResult<HawkesParams<'a>> {
        if coeffs.len() != self.n_coeffs() {
            return Err(HawkesError::CoeffLengthMismatch {
                expected: self.n_coeffs(),
                actual: coeffs.len(),
            });
        }
        Ok(HawkesParams { layout: *self, coeffs })
    }
}

/// HawkesParams — named read access to a flat coefficient vector.
///
/// Borrowed, zero-copy, `Copy`: every per-dimension task takes its own copy
/// of the view. Length is checked once at construction by
/// [`ParamLayout::view`]; accessors index without further checks.
#[derive(Debug, Clone, Copy)]
pub struct HawkesParams<'a> {
    layout: ParamLayout,
    coeffs: ArrayView1<'a, f64>,
}

impl<'a> HawkesParams<'a> {
    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    /// Baseline rate `mu_i`.
    #[inline]
    pub fn baseline(&self, i: usize) -> f64 {
        self.coeffs[self.layout.baseline_index(i)]
    }

    /// Interaction weight `alpha_{u,i,j}` (kernel `u`, target `i`, source `j`).
    #[inline]
    pub fn interaction(&self, u: usize, i: usize, j: usize) -> f64 {
        self.coeffs[self.layout.interaction_index(u, i, j)]
    }

    /// Link value `f_i[n]`.
    #[inline]
    pub fn link(&self, i: usize, n: usize) -> f64 {
        self.coeffs[self.layout.link_index(i, n)]
    }

    /// Alpha block of dimension `i`, indexed `u·D + j`.
    pub fn interaction_block(&self, i: usize) -> ArrayView1<'a, f64> {
        let start = self.layout.alpha_block_start(i);
        self.coeffs.slice_move(s![start..start + self.layout.alpha_block_len()])
    }

    /// Link table `f_i[0..S)` of dimension `i`.
    pub fn link_table(&self, i: usize) -> ArrayView1<'a, f64> {
        let start = self.layout.link_index(i, 0);
        self.coeffs.slice_move(s![start..start + self.layout.n_states])
    }
}
